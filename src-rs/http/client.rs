use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::task::UploadFile;

/// Thin wrapper over the task endpoints of the processing server. Bodies come
/// back as raw JSON values; field extraction and classification live with the
/// lifecycle logic.
#[derive(Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|err| ClientError::BaseUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::BaseUrl(format!(
                "cannot build endpoints on {}",
                base_url
            )));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// `{base}/api/tasks[/{segment}...]` with every segment percent-encoded.
    fn tasks_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").push("tasks").extend(segments);
        }
        url
    }

    pub fn result_url(&self, id: &str) -> String {
        self.tasks_url(&[id, "result"]).to_string()
    }

    /// Uploads the document as multipart form data under the `file` field and
    /// returns the creation response body.
    pub async fn create_task(&self, file: UploadFile) -> Result<Value, ClientError> {
        let url = self.tasks_url(&[]);
        debug!(url = %url, file = %file.name, size = file.bytes.len(), "uploading document");

        let UploadFile { name, mime, bytes } = file;
        let part = Part::bytes(bytes).file_name(name).mime_str(&mime)?;
        let form = Form::new().part("file", part);

        let resp = self.http.post(url).multipart(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Upload {
                status: status.as_u16(),
            });
        }
        resp.json::<Value>()
            .await
            .map_err(|_| ClientError::MalformedResponse("create response is not valid JSON"))
    }

    pub async fn task_status(&self, id: &str) -> Result<Value, ClientError> {
        let url = self.tasks_url(&[id]);
        debug!(url = %url, "querying task status");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::StatusQuery {
                status: status.as_u16(),
            });
        }
        resp.json::<Value>()
            .await
            .map_err(|_| ClientError::MalformedResponse("status response is not valid JSON"))
    }

    /// Fetches the artifact of a completed task. The lifecycle tracker never
    /// calls this; pulling the result is a caller decision.
    pub async fn download_result(&self, id: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.tasks_url(&[id, "result"]);
        debug!(url = %url, "downloading result");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        // the server answers 202 with a JSON body while the task is still running
        if status == reqwest::StatusCode::ACCEPTED || !status.is_success() {
            return Err(ClientError::Download {
                status: status.as_u16(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
