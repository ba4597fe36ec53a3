//! Payload binding through `FromDispatch`, checked against direct decoding.

use std::sync::Arc;
use std::time::Duration;

use heron_core::{DefaultServerContext, Request, RequestContext, ResponseWriter, Session};
use heron_extract::{DispatchParts, FromDispatch, ParamRole, Payload};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Order {
    sku: String,
    quantity: u32,
    gift: bool,
    #[serde(default)]
    notes: Vec<String>,
}

fn parts_for(req: Request) -> DispatchParts {
    let ctx = RequestContext::new(
        Arc::new(DefaultServerContext::new()),
        Arc::new(Session::new("props", Duration::from_secs(60))),
    );
    DispatchParts::new(ctx, ResponseWriter::new(), req)
}

fn json_post(content_type: &str, body: Vec<u8>) -> Request {
    Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", content_type)
        .body(body)
        .unwrap()
}

fn order_strategy() -> impl Strategy<Value = Order> {
    (
        "[a-zA-Z0-9-]{0,12}",
        any::<u32>(),
        any::<bool>(),
        prop::collection::vec("[ -~]{0,8}", 0..4),
    )
        .prop_map(|(sku, quantity, gift, notes)| Order {
            sku,
            quantity,
            gift,
            notes,
        })
}

proptest! {
    #[test]
    fn payload_matches_direct_json_decoding(order in order_strategy()) {
        let body = serde_json::to_vec(&order).unwrap();
        let expected: Order = serde_json::from_slice(&body).unwrap();

        let parts = parts_for(json_post("application/json", body));
        let Payload(bound) = Payload::<Order>::bind(&parts).unwrap();
        prop_assert_eq!(bound, expected);
    }

    #[test]
    fn media_type_case_and_parameters_are_ignored(order in order_strategy(), upper in any::<bool>()) {
        let content_type = if upper { "TEXT/JSON; charset=UTF-8" } else { "text/json;charset=utf-8" };
        let body = serde_json::to_vec(&order).unwrap();

        let parts = parts_for(json_post(content_type, body));
        let Payload(bound) = Payload::<Order>::bind(&parts).unwrap();
        prop_assert_eq!(bound, order);
    }
}

#[test]
fn payload_role_is_recorded() {
    assert_eq!(<Payload<Order> as FromDispatch>::ROLE, ParamRole::Payload);
}

#[test]
fn xml_payload_binds() {
    let req = Request::builder()
        .method("PATCH")
        .uri("/orders/1")
        .header("content-type", "application/xml")
        .body("<order><sku>A-1</sku><quantity>3</quantity><gift>true</gift></order>")
        .unwrap();

    let Payload(order) = Payload::<Order>::bind(&parts_for(req)).unwrap();
    assert_eq!(order.sku, "A-1");
    assert_eq!(order.quantity, 3);
    assert!(order.gift);
    assert!(order.notes.is_empty());
}
