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

//! Typed access to configuration stored in environment variables.
//!
//! Variables are grouped by a common prefix (like `RIDES` or `PGSQL_PROD`) and looked up as
//! `<prefix>_<suffix>`.

use std::env;
use std::str::FromStr;

/// Errors that arise while reading configuration from the environment.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EnvError {
    /// The variable exists but its contents are not valid UTF-8.
    #[error("Invalid value in environment variable {0}")]
    NotUnicode(String),

    /// The variable exists but its contents cannot be interpreted as the requested type.
    #[error("Invalid value '{value}' in environment variable {name}: {reason}")]
    BadValue {
        /// Name of the variable.
        name: String,

        /// Raw contents of the variable.
        value: String,

        /// Why the contents were rejected.
        reason: String,
    },

    /// A required variable is not set.
    #[error("Required environment variable {0} not present")]
    Missing(String),
}

/// Result type for this module.
pub type EnvResult<T> = Result<T, EnvError>;

/// Raw contents of an environment variable, to be converted into its final type via `TryFrom`.
pub struct Value(String);

impl TryFrom<Value> for String {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(value.0)
    }
}

/// Parses `value` with `FromStr`, describing failures by the expected type.
fn parse_value<T>(value: &Value, type_name: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.0.parse::<T>().map_err(|e| format!("expected {}: {}", type_name, e))
}

impl TryFrom<Value> for u16 {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        parse_value(&value, "a port number")
    }
}

impl TryFrom<Value> for u32 {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        parse_value(&value, "a count")
    }
}

/// Reads the variable `<prefix>_<suffix>` and converts it to `T`, or returns `None` if unset.
pub fn get_optional_var<T: TryFrom<Value, Error = String>>(
    prefix: &str,
    suffix: &str,
) -> EnvResult<Option<T>> {
    let name = format!("{}_{}", prefix, suffix);
    let raw = match env::var(&name) {
        Ok(raw) => raw,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(env::VarError::NotUnicode(_)) => return Err(EnvError::NotUnicode(name)),
    };
    T::try_from(Value(raw.clone()))
        .map(Some)
        .map_err(|reason| EnvError::BadValue { name, value: raw, reason })
}

/// Reads the variable `<prefix>_<suffix>` and converts it to `T`, failing if it is unset.
pub fn get_required_var<T: TryFrom<Value, Error = String>>(
    prefix: &str,
    suffix: &str,
) -> EnvResult<T> {
    get_optional_var(prefix, suffix)?
        .ok_or_else(|| EnvError::Missing(format!("{}_{}", prefix, suffix)))
}
