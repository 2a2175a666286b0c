use serde_json::{Map, Value};

use crate::error::{ReplyError, RequestError};

/// Reply code some service versions use for "unchanged" successful updates.
pub const NOT_MODIFIED: u16 = 304;

const DEFAULT_SUCCESS_CODES: [u16; 2] = [200, 204];

/// A successfully decoded reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Status code, always a member of the policy's success set.
    pub code: u16,
    /// Payload taken verbatim from the reply; `None` when the field is absent.
    /// A present `null` is kept as `Some(Value::Null)`.
    pub data: Option<Value>,
    /// True when the change only takes effect after a service restart.
    /// Defaults to `false` when the reply omits it.
    pub dirty: bool,
}

impl Reply {
    /// Look up a named member of an object payload.
    ///
    /// Config reads answer with `{"value": ...}`, so `reply.data_field("value")`
    /// is the usual way to get at the parameter.
    pub fn data_field(&self, name: &str) -> Option<&Value> {
        self.data.as_ref()?.as_object()?.get(name)
    }

    /// The payload when it is a plain string.
    pub fn data_str(&self) -> Option<&str> {
        self.data.as_ref()?.as_str()
    }
}

/// Which reply codes count as success.
///
/// The protocol has drifted across service versions; the default set is
/// `{200, 204}` and deployments that answer `304` can opt in with
/// [`ReplyPolicy::with_not_modified`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPolicy {
    success_codes: Vec<u16>,
}

impl Default for ReplyPolicy {
    fn default() -> Self {
        Self {
            success_codes: DEFAULT_SUCCESS_CODES.to_vec(),
        }
    }
}

impl ReplyPolicy {
    /// Policy with an explicit success set.
    pub fn new(success_codes: impl IntoIterator<Item = u16>) -> Self {
        let mut success_codes: Vec<u16> = success_codes.into_iter().collect();
        success_codes.sort_unstable();
        success_codes.dedup();
        Self { success_codes }
    }

    /// Additionally accept `304 Not Modified` as success.
    pub fn with_not_modified(self) -> Self {
        self.accept(NOT_MODIFIED)
    }

    /// Additionally accept `code` as success.
    pub fn accept(mut self, code: u16) -> Self {
        if !self.success_codes.contains(&code) {
            self.success_codes.push(code);
            self.success_codes.sort_unstable();
        }
        self
    }

    /// The configured success set, ascending.
    pub fn success_codes(&self) -> &[u16] {
        &self.success_codes
    }

    /// Whether `code` is in the success set.
    pub fn is_success(&self, code: u16) -> bool {
        self.success_codes.contains(&code)
    }

    /// Decode raw reply bytes under this policy.
    ///
    /// Success codes win over rejection codes if a deployment configures an
    /// overlap.
    pub fn decode(&self, raw: &[u8]) -> Result<Reply, ReplyError> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|err| ReplyError::malformed(format!("not valid JSON: {err}")))?;
        let Value::Object(mut fields) = value else {
            return Err(ReplyError::malformed("reply is not a JSON object"));
        };

        let code = reply_code(&fields)?;
        let Ok(status) = u16::try_from(code) else {
            return Err(ReplyError::UnknownCode(code));
        };

        if self.is_success(status) {
            let dirty = coerce_dirty(fields.get("dirty"))?;
            return Ok(Reply {
                code: status,
                data: fields.remove("data"),
                dirty,
            });
        }

        match RequestError::from_code(status) {
            Some(err) => Err(err.into()),
            None => Err(ReplyError::UnknownCode(code)),
        }
    }
}

/// Decode raw reply bytes with the default success set `{200, 204}`.
pub fn decode(raw: &[u8]) -> Result<Reply, ReplyError> {
    ReplyPolicy::default().decode(raw)
}

fn reply_code(fields: &Map<String, Value>) -> Result<i128, ReplyError> {
    let code = fields
        .get("code")
        .ok_or_else(|| ReplyError::malformed("missing \"code\" field"))?;
    code.as_i64()
        .map(i128::from)
        .or_else(|| code.as_u64().map(i128::from))
        .ok_or_else(|| ReplyError::malformed(format!("\"code\" is not an integer: {code}")))
}

/// Read the `dirty` flag. Absent or `null` means `false`.
fn coerce_dirty(value: Option<&Value>) -> Result<bool, ReplyError> {
    let dirty = match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" | "" => false,
            _ => {
                return Err(ReplyError::malformed(format!(
                    "\"dirty\" is not a boolean: {s:?}"
                )))
            }
        },
        Some(other) => {
            return Err(ReplyError::malformed(format!(
                "\"dirty\" is not a boolean: {other}"
            )))
        }
    };
    Ok(dirty)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn config_read_reply() {
        let reply = decode(br#"{"code":200,"data":{"value":"3"}}"#).unwrap();
        assert_eq!(reply.code, 200);
        assert_eq!(reply.data, Some(json!({"value": "3"})));
        assert!(!reply.dirty);
        assert_eq!(reply.data_field("value"), Some(&json!("3")));
    }

    #[test]
    fn bare_204_has_absent_data_and_clean_flag() {
        let reply = decode(br#"{"code":204}"#).unwrap();
        assert_eq!(
            reply,
            Reply {
                code: 204,
                data: None,
                dirty: false
            }
        );
    }

    #[test]
    fn absent_data_differs_from_empty_and_null() {
        assert_eq!(decode(br#"{"code":200}"#).unwrap().data, None);
        assert_eq!(
            decode(br#"{"code":200,"data":""}"#).unwrap().data,
            Some(json!(""))
        );
        assert_eq!(
            decode(br#"{"code":200,"data":{}}"#).unwrap().data,
            Some(json!({}))
        );
        assert_eq!(
            decode(br#"{"code":200,"data":null}"#).unwrap().data,
            Some(Value::Null)
        );
    }

    #[test]
    fn data_is_taken_verbatim_for_any_json_type() {
        let reply = decode(br#"{"code":200,"data":[{"imsi":"001"},{"imsi":"002"}]}"#).unwrap();
        assert_eq!(reply.data, Some(json!([{"imsi": "001"}, {"imsi": "002"}])));

        let reply = decode(br#"{"code":200,"data":"release 4.0.0.8025"}"#).unwrap();
        assert_eq!(reply.data_str(), Some("release 4.0.0.8025"));
    }

    #[test]
    fn dirty_flag_coercions() {
        let cases: &[(&str, bool)] = &[
            (r#"true"#, true),
            (r#"false"#, false),
            (r#"1"#, true),
            (r#"0"#, false),
            (r#"2"#, true),
            (r#"0.0"#, false),
            (r#""true""#, true),
            (r#""TRUE""#, true),
            (r#""1""#, true),
            (r#""yes""#, true),
            (r#""false""#, false),
            (r#""0""#, false),
            (r#""""#, false),
            (r#"null"#, false),
        ];

        for (dirty, expected) in cases {
            let raw = format!(r#"{{"code":204,"dirty":{dirty}}}"#);
            let reply = decode(raw.as_bytes())
                .unwrap_or_else(|err| panic!("dirty={dirty} should decode: {err}"));
            assert_eq!(reply.dirty, *expected, "dirty={dirty}");
        }
    }

    #[test]
    fn uncoercible_dirty_is_malformed() {
        for dirty in [r#""maybe""#, r#"[]"#, r#"{"a":1}"#] {
            let raw = format!(r#"{{"code":200,"dirty":{dirty}}}"#);
            assert!(
                matches!(decode(raw.as_bytes()), Err(ReplyError::Malformed { .. })),
                "dirty={dirty}"
            );
        }
    }

    #[test]
    fn rejection_codes_map_to_exact_kinds() {
        let cases = [
            (404, RequestError::UnknownKey),
            (406, RequestError::InvalidValue),
            (409, RequestError::ConflictingValue),
            (500, RequestError::StorageFailure),
            (501, RequestError::ProtocolMismatch),
        ];

        for (code, expected) in cases {
            let raw = format!(r#"{{"code":{code},"data":"ignored","dirty":true}}"#);
            assert_eq!(
                decode(raw.as_bytes()),
                Err(ReplyError::Request(expected)),
                "code {code}"
            );
        }
    }

    #[test]
    fn unknown_codes_carry_the_raw_code() {
        for code in [0i128, 201, 302, 304, 400, 418, 503, -1, 70000] {
            let raw = format!(r#"{{"code":{code}}}"#);
            assert_eq!(decode(raw.as_bytes()), Err(ReplyError::UnknownCode(code)));
        }
    }

    #[test]
    fn codes_beyond_i64_are_unknown_not_malformed() {
        let raw = br#"{"code":18446744073709551615}"#;
        assert_eq!(
            decode(raw),
            Err(ReplyError::UnknownCode(i128::from(u64::MAX)))
        );
        assert_eq!(
            decode(br#"{"code":-9223372036854775808}"#),
            Err(ReplyError::UnknownCode(i128::from(i64::MIN)))
        );
    }

    #[test]
    fn unparsable_or_codeless_replies_are_malformed() {
        for raw in [
            &b"not json"[..],
            b"",
            b"[200]",
            b"\"code\"",
            br#"{"data":{"value":"3"}}"#,
            br#"{"code":"200"}"#,
            br#"{"code":200.5}"#,
            br#"{"code":null}"#,
        ] {
            assert!(
                matches!(decode(raw), Err(ReplyError::Malformed { .. })),
                "{:?} should be malformed",
                String::from_utf8_lossy(raw)
            );
        }
    }

    #[test]
    fn not_modified_is_opt_in() {
        let raw = br#"{"code":304,"dirty":0}"#;
        assert_eq!(decode(raw), Err(ReplyError::UnknownCode(304)));

        let policy = ReplyPolicy::default().with_not_modified();
        assert_eq!(policy.success_codes(), &[200, 204, 304]);
        let reply = policy.decode(raw).unwrap();
        assert_eq!(reply.code, 304);
        assert!(!reply.dirty);
    }

    #[test]
    fn explicit_success_set_is_sorted_and_deduplicated() {
        let policy = ReplyPolicy::new([204, 200, 204]).accept(200);
        assert_eq!(policy.success_codes(), &[200, 204]);
        assert!(policy.is_success(204));
        assert!(!policy.is_success(304));
    }

    #[test]
    fn configured_success_overrides_rejection() {
        let policy = ReplyPolicy::default().accept(409);
        assert_eq!(policy.decode(br#"{"code":409}"#).unwrap().code, 409);
    }
}
