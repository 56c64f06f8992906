use serde::Deserialize;
use utoipa::IntoParams;

/// Page selector of the listing views. Kept as raw text so that junk values
/// fall back to the first page instead of rejecting the request.
#[derive(Debug, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn raw(&self) -> Option<&str> {
        self.page.as_deref()
    }
}
