//! Inline keyboard callback data.
//!
//! Two shapes travel through Telegram buttons:
//! - `upload_<host>:<key>` picks a host for a staged session
//! - `delete_image:<key>` discards it

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::hosts::HostKind;
use crate::staging::SessionKey;

const UPLOAD_PREFIX: &str = "upload_";
const DELETE_VERB: &str = "delete_image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Upload { host: HostKind, key: SessionKey },
    Delete { key: SessionKey },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionParseError {
    #[error("unknown action verb: {0:?}")]
    UnknownVerb(String),

    #[error("unknown image host: {0:?}")]
    UnknownHost(String),

    #[error("callback data has no session key: {0:?}")]
    MissingKey(String),
}

impl Action {
    pub fn key(&self) -> &SessionKey {
        match self {
            Action::Upload { key, .. } | Action::Delete { key } => key,
        }
    }

    /// Callback data string for this action
    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn parse(data: &str) -> Result<Self, ActionParseError> {
        data.parse()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Upload { host, key } => write!(f, "{}{}:{}", UPLOAD_PREFIX, host.as_str(), key),
            Action::Delete { key } => write!(f, "{}:{}", DELETE_VERB, key),
        }
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let (verb, key) = data
            .split_once(':')
            .ok_or_else(|| ActionParseError::MissingKey(data.to_string()))?;
        if key.is_empty() {
            return Err(ActionParseError::MissingKey(data.to_string()));
        }
        let key = SessionKey::from(key);

        if verb == DELETE_VERB {
            return Ok(Action::Delete { key });
        }
        match verb.strip_prefix(UPLOAD_PREFIX) {
            Some(host) => {
                let host = HostKind::from_str(host).map_err(|_| ActionParseError::UnknownHost(host.to_string()))?;
                Ok(Action::Upload { host, key })
            }
            None => Err(ActionParseError::UnknownVerb(verb.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_upload() {
        let action = Action::parse("upload_imgbb:abc123").unwrap();
        assert_eq!(
            action,
            Action::Upload {
                host: HostKind::Imgbb,
                key: SessionKey::from("abc123"),
            }
        );
        assert_eq!(action.key().as_str(), "abc123");
    }

    #[test]
    fn test_parse_delete() {
        assert_eq!(
            Action::parse("delete_image:abc123").unwrap(),
            Action::Delete {
                key: SessionKey::from("abc123")
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Action::parse("upload_catbox:k").unwrap_err(),
            ActionParseError::UnknownHost("catbox".to_string())
        );
        assert_eq!(
            Action::parse("rename:k").unwrap_err(),
            ActionParseError::UnknownVerb("rename".to_string())
        );
        assert!(matches!(Action::parse("upload_envs"), Err(ActionParseError::MissingKey(_))));
        assert!(matches!(Action::parse("delete_image:"), Err(ActionParseError::MissingKey(_))));
    }

    #[test]
    fn test_encoded_actions_fit_callback_limit() {
        let key = SessionKey::generate();
        for host in HostKind::iter() {
            let data = Action::Upload { host, key: key.clone() }.encode();
            assert!(data.len() <= 64, "{} is {} bytes", data, data.len());
            assert_eq!(Action::parse(&data).unwrap().key(), &key);
        }
        let delete = Action::Delete { key }.encode();
        assert!(delete.len() <= 64);
    }
}
