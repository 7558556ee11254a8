//! Request sum type (spec.md §3, §4.2, §9). The original source models GET
//! and SET as a virtual-dispatch hierarchy rooted at `FIPCRequest`; per
//! spec.md §9 this becomes one tagged variant with three concrete shapes,
//! and the `IsEmpty`/`Size`/`GetPlayerAuthID` contract becomes a small
//! trait implemented per variant instead of virtual calls.

use crate::attribute::{AttributeList, AttributeName};
use crate::token::Rid;

/// Common contract of every request shape.
pub trait RequestShape {
    fn subject(&self) -> &str;
    fn rid(&self) -> Rid;
    fn size(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// A GET request: which attributes of `subject` to retrieve.
#[derive(Debug, Clone)]
pub struct GetRequest {
    subject: String,
    rid: Rid,
    want: Vec<AttributeName>,
}

impl GetRequest {
    /// Constructs a GET request. The subject-identifier name is silently
    /// deduplicated out of `want` if present, and `want` itself is
    /// deduplicated (spec.md §4.2).
    pub fn new(subject: impl Into<String>, rid: Rid, want: Vec<AttributeName>) -> Self {
        let mut deduped = Vec::with_capacity(want.len());
        for name in want {
            if name == AttributeName::PlayerAuthId || name == AttributeName::None {
                continue;
            }
            if !deduped.contains(&name) {
                deduped.push(name);
            }
        }
        GetRequest {
            subject: subject.into(),
            rid,
            want: deduped,
        }
    }

    pub fn want(&self) -> &[AttributeName] {
        &self.want
    }
}

impl RequestShape for GetRequest {
    fn subject(&self) -> &str {
        &self.subject
    }
    fn rid(&self) -> Rid {
        self.rid
    }
    fn size(&self) -> usize {
        self.want.len()
    }
}

/// A SET request: the fully populated attribute list to apply to `subject`.
#[derive(Debug, Clone)]
pub struct SetRequest {
    subject: String,
    rid: Rid,
    attributes: AttributeList,
}

impl SetRequest {
    pub fn new(subject: impl Into<String>, rid: Rid, attributes: AttributeList) -> Self {
        SetRequest {
            subject: subject.into(),
            rid,
            attributes,
        }
    }

    pub fn attributes(&self) -> &AttributeList {
        &self.attributes
    }
}

impl RequestShape for SetRequest {
    fn subject(&self) -> &str {
        &self.subject
    }
    fn rid(&self) -> Rid {
        self.rid
    }
    fn size(&self) -> usize {
        self.attributes.size()
    }
}

/// A GET_RESPONSE: the RID of the originating GET and the retrieved values.
#[derive(Debug, Clone)]
pub struct GetResponse {
    subject: String,
    rid: Rid,
    attributes: AttributeList,
}

impl GetResponse {
    pub fn new(subject: impl Into<String>, rid: Rid, attributes: AttributeList) -> Self {
        GetResponse {
            subject: subject.into(),
            rid,
            attributes,
        }
    }

    pub fn attributes(&self) -> &AttributeList {
        &self.attributes
    }
}

impl RequestShape for GetResponse {
    fn subject(&self) -> &str {
        &self.subject
    }
    fn rid(&self) -> Rid {
        self.rid
    }
    fn size(&self) -> usize {
        self.attributes.size()
    }
}

/// A client-side record pairing a GET with the file-local id it was
/// flushed under, kept until the matching GET_RESPONSE is consumed or
/// shutdown clears it (spec.md §3, §4.9).
#[derive(Debug, Clone)]
pub struct PendingGet {
    pub request: GetRequest,
}

impl PendingGet {
    pub fn new(request: GetRequest) -> Self {
        PendingGet { request }
    }

    pub fn rid(&self) -> Rid {
        self.request.rid()
    }
}

impl RequestShape for PendingGet {
    fn subject(&self) -> &str {
        self.request.subject()
    }
    fn rid(&self) -> Rid {
        self.request.rid()
    }
    fn size(&self) -> usize {
        self.request.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeValue;

    #[test]
    fn get_request_drops_subject_name_from_want() {
        let req = GetRequest::new(
            "XYZ",
            Rid::from(1),
            vec![AttributeName::PlayerAuthId, AttributeName::PlayerName],
        );
        assert_eq!(req.want(), &[AttributeName::PlayerName]);
    }

    #[test]
    fn get_request_dedupes_want() {
        let req = GetRequest::new(
            "XYZ",
            Rid::from(1),
            vec![AttributeName::PlayerName, AttributeName::PlayerName],
        );
        assert_eq!(req.want(), &[AttributeName::PlayerName]);
    }

    #[test]
    fn set_request_empty_when_no_attributes() {
        let req = SetRequest::new("XYZ", Rid::from(1), AttributeList::new());
        assert!(req.is_empty());
    }

    #[test]
    fn set_request_not_empty_with_one_attribute() {
        let mut attrs = AttributeList::new();
        attrs.set(AttributeName::IsOnline, AttributeValue::Bool(true));
        let req = SetRequest::new("XYZ", Rid::from(1), attrs);
        assert!(!req.is_empty());
        assert_eq!(req.size(), 1);
    }

    #[test]
    fn pending_get_exposes_originating_rid() {
        let get = GetRequest::new("XYZ", Rid::from(7), vec![AttributeName::PlayerName]);
        let pending = PendingGet::new(get);
        assert_eq!(pending.rid().value(), 7);
    }
}
