//! Round-trip laws (R1/R2): decoding an encoded batch yields the same
//! batch under attribute-list equality, independent of attribute
//! insertion order.

use ipcf_core::codec::{decode_get_file, decode_get_response_file, decode_set_file, encode_get_batch, encode_get_response_batch, encode_set_batch};
use ipcf_core::{AttributeList, AttributeName, AttributeValue, GetRequest, GetResponse, RequestShape, Rid, SetRequest};

fn sample_attrs(i: u64) -> AttributeList {
    let mut attrs = AttributeList::new();
    attrs.set(AttributeName::PlayerAuthId, AttributeValue::Str(format!("subject-{}", i)));
    if i % 2 == 0 {
        attrs.set(AttributeName::IsOnline, AttributeValue::Bool(true));
    } else {
        attrs.set(AttributeName::PlayerName, AttributeValue::Str(format!("name-{}", i)));
    }
    attrs
}

#[test]
fn r1_set_batch_round_trips_under_attribute_equality() {
    let batch: Vec<SetRequest> = (0..50).map(|i| SetRequest::new(format!("subject-{}", i), Rid::from(i), sample_attrs(i))).collect();
    let encoded = encode_set_batch(&batch);
    let decoded = decode_set_file(&encoded).unwrap();

    assert_eq!(decoded.len(), batch.len());
    for (original, round_tripped) in batch.iter().zip(decoded.iter()) {
        assert_eq!(original.subject(), round_tripped.subject());
        assert_eq!(original.rid(), round_tripped.rid());
        assert!(original.attributes().equivalent(round_tripped.attributes()));
    }
}

#[test]
fn r2_get_request_retrieval_names_round_trip() {
    let batch: Vec<GetRequest> = (0..50)
        .map(|i| {
            let want = if i % 2 == 0 {
                vec![AttributeName::PlayerName, AttributeName::IsOnline]
            } else {
                vec![AttributeName::IsOnline]
            };
            GetRequest::new(format!("subject-{}", i), Rid::from(i), want)
        })
        .collect();
    let encoded = encode_get_batch(&batch);
    let decoded = decode_get_file(&encoded).unwrap();

    assert_eq!(decoded.len(), batch.len());
    for (original, round_tripped) in batch.iter().zip(decoded.iter()) {
        let mut original_want = original.want().to_vec();
        let mut round_tripped_want = round_tripped.want().to_vec();
        original_want.sort_by_key(|n| n.as_key());
        round_tripped_want.sort_by_key(|n| n.as_key());
        assert_eq!(original_want, round_tripped_want);
    }
}

#[test]
fn r2_get_response_attribute_values_round_trip() {
    let batch: Vec<GetResponse> = (0..50).map(|i| GetResponse::new(format!("subject-{}", i), Rid::from(i), sample_attrs(i))).collect();
    let encoded = encode_get_response_batch(&batch);
    let decoded = decode_get_response_file(&encoded).unwrap();

    assert_eq!(decoded.len(), batch.len());
    for (original, round_tripped) in batch.iter().zip(decoded.iter()) {
        assert!(original.attributes().equivalent(round_tripped.attributes()));
    }
}
