use crate::utils::error::{Result, StoreError};
use crate::utils::validation::validate_positive_number;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// The `{success, data, message, errorCode}` wrapper every call resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(rename = "success")]
    pub success: bool,
    #[serde(rename = "data")]
    pub data: Option<T>,
    #[serde(rename = "message", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "errorCode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error_code: None,
        }
    }

    pub fn failure(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error_code: Some(error_code.into()),
        }
    }

    pub fn map_data<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            message: self.message,
            error_code: self.error_code,
        }
    }

    /// Resolves the envelope into the payload or a classified failure. A
    /// successful envelope without data is a shape error.
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(StoreError::from_envelope_failure(
                self.error_code.as_deref(),
                self.message.as_deref(),
            ));
        }
        self.data
            .ok_or_else(|| StoreError::decode("envelope reported success but carried no data"))
    }

    /// Like [`ApiResponse::into_data`] for operations whose payload is ignored.
    pub fn into_unit(self) -> Result<()> {
        if !self.success {
            return Err(StoreError::from_envelope_failure(
                self.error_code.as_deref(),
                self.message.as_deref(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    #[serde(rename = "items")]
    pub items: Vec<T>,
    #[serde(rename = "totalCount")]
    pub total_count: u64,
    #[serde(rename = "page")]
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

impl<T> PagedResponse<T> {
    pub fn has_more(&self) -> bool {
        u64::from(self.page) * u64::from(self.page_size) < self.total_count
    }

    /// Rejects pages the backend should never produce.
    pub fn validate(self) -> Result<Self> {
        if self.page < 1 || self.page_size < 1 {
            return Err(StoreError::decode(format!(
                "page metadata out of range: page={}, pageSize={}",
                self.page, self.page_size
            )));
        }
        Ok(self)
    }
}

/// Validated 1-based pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32, max_page_size: u32) -> Result<Self> {
        validate_positive_number("page", page.into(), 1)?;
        validate_positive_number("pageSize", page_size.into(), 1)?;
        if page_size > max_page_size {
            return Err(StoreError::validation(
                "pageSize",
                format!("at most {} items per page, got {}", max_page_size, page_size),
            ));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
