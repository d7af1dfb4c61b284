use checkout_engine::config::QueueConfig;
use checkout_engine::domain::order::{CheckoutResponse, OrderStatus};
use common::{Call, FakeCollaborators, request};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod common;

#[tokio::test]
async fn test_two_line_items_with_tax_succeeds() {
    let fakes = FakeCollaborators::default().with_tax(dec!(2.5));
    let service = fakes.service(&QueueConfig::unbounded());
    let request = request(&[("sku-1", 2, dec!(10)), ("sku-2", 1, dec!(5))]);
    let customer_id = request.customer_id;

    let ack = service.submit(request).await.unwrap();
    assert_eq!(ack.status, OrderStatus::InProgress);
    service.shutdown().await.unwrap();

    assert_eq!(
        fakes.calls(),
        vec![
            Call::Validate,
            Call::Tax(customer_id),
            Call::Pay(customer_id, dec!(27.5)),
            Call::Success(
                customer_id,
                CheckoutResponse::successful(ack.order_id),
                dec!(27.5)
            ),
        ]
    );
}

#[tokio::test]
async fn test_out_of_stock_skips_remaining_stages() {
    let fakes = FakeCollaborators::default()
        .with_tax(dec!(2.5))
        .out_of_stock();
    let service = fakes.service(&QueueConfig::unbounded());
    let request = request(&[("sku-1", 2, dec!(10)), ("sku-2", 1, dec!(5))]);
    let customer_id = request.customer_id;

    let ack = service.submit(request).await.unwrap();
    service.shutdown().await.unwrap();

    let calls = fakes.calls();
    assert_eq!(
        calls,
        vec![
            Call::Validate,
            Call::Failure(customer_id, CheckoutResponse::out_of_stock(ack.order_id)),
        ]
    );
    match &calls[1] {
        Call::Failure(_, response) => {
            assert_eq!(response.status, OrderStatus::Failure);
            assert_eq!(response.message, "Item not available in stock");
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[tokio::test]
async fn test_declined_payment_reports_failure_once() {
    let fakes = FakeCollaborators::default().declining();
    let service = fakes.service(&QueueConfig::unbounded());
    let request = request(&[("sku-1", 1, dec!(99.99))]);
    let customer_id = request.customer_id;

    let ack = service.submit(request).await.unwrap();
    let report = service.shutdown().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(
        fakes.reports(),
        vec![Call::Failure(
            customer_id,
            CheckoutResponse::payment_failure(ack.order_id)
        )]
    );
}

#[tokio::test]
async fn test_reported_amount_is_exact_sum() {
    let mut rng = rand::thread_rng();
    let tax = Decimal::new(rng.gen_range(0..10_000), 2);
    let fakes = FakeCollaborators::default().with_tax(tax);
    let service = fakes.service(&QueueConfig::unbounded());

    let mut expected = Vec::new();
    for _ in 0..20 {
        let lines: Vec<(String, u32, Decimal)> = (0..rng.gen_range(1..6))
            .map(|i| {
                (
                    format!("sku-{i}"),
                    rng.gen_range(1..50),
                    Decimal::new(rng.gen_range(0..100_000), 2),
                )
            })
            .collect();
        let borrowed: Vec<(&str, u32, Decimal)> = lines
            .iter()
            .map(|(sku, quantity, price)| (sku.as_str(), *quantity, *price))
            .collect();
        let subtotal: Decimal = lines
            .iter()
            .map(|(_, quantity, price)| Decimal::from(*quantity) * *price)
            .sum();
        expected.push(subtotal + tax);
        service.submit(request(&borrowed)).await.unwrap();
    }
    service.shutdown().await.unwrap();

    let amounts: Vec<Decimal> = fakes
        .reports()
        .into_iter()
        .map(|call| match call {
            Call::Success(_, _, amount) => amount,
            other => panic!("unexpected report {:?}", other),
        })
        .collect();
    assert_eq!(amounts, expected);
}
