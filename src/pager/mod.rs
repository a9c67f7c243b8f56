use crate::api::ApiResult;
use crate::models::{MoreCodeRequest, MoreCodeResponse};

/// "Load more" pagination over item listings.
#[derive(Clone, Debug)]
pub struct Pager {
    kind: String,
    page: u32,
    exhausted: bool,
    in_flight: bool,
}

impl Pager {
    pub fn new(kind: impl Into<String>, page: u32) -> Self {
        Self {
            kind: kind.into(),
            page,
            exhausted: false,
            in_flight: false,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// `None` while a request is running or after the last page.
    pub fn next_request(&mut self) -> Option<MoreCodeRequest> {
        if self.in_flight || self.exhausted {
            return None;
        }
        self.in_flight = true;
        Some(MoreCodeRequest {
            kind: self.kind.clone(),
            page: self.page + 1,
        })
    }

    pub fn complete(&mut self, result: ApiResult<MoreCodeResponse>) -> ApiResult<Vec<serde_json::Value>> {
        self.in_flight = false;
        let resp = result?;
        self.page += 1;
        self.exhausted = resp.no_more;
        Ok(resp.codes)
    }
}
