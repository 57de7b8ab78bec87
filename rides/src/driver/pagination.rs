// Ridebook
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Conversion of pagination parameters into result windows.

use crate::driver::{DriverError, DriverResult};
use crate::model::{PageRequest, PageWindow};

/// Parses the raw value of the `name` parameter as a positive integer.
fn parse_positive(name: &str, raw: Option<&str>) -> DriverResult<i64> {
    let Some(raw) = raw else {
        return Err(DriverError::MalformedRequest(format!("Missing {} parameter", name)));
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(DriverError::MalformedRequest(format!(
            "{} must be a positive integer but got '{}'",
            name, raw
        ))),
    }
}

/// Computes the window of rides requested by `request`.
///
/// Returns `None` if the request carries no pagination parameters at all, which means that all
/// rides are wanted.  Otherwise, both parameters must be present and valid.
pub(super) fn page_window(request: &PageRequest) -> DriverResult<Option<PageWindow>> {
    if request.page_no.is_none() && request.page_size.is_none() {
        return Ok(None);
    }

    let page_no = parse_positive("page_no", request.page_no.as_deref())?;
    let page_size = parse_positive("page_size", request.page_size.as_deref())?;

    // Both quantities are positive so the only possible failure is an overflow.
    match (page_no - 1).checked_mul(page_size) {
        Some(offset) => Ok(Some(PageWindow::new(offset, page_size))),
        None => Err(DriverError::MalformedRequest(format!(
            "Page {} of size {} is out of range",
            page_no, page_size
        ))),
    }
}
