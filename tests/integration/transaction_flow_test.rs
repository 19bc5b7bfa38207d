// End-to-end transaction lifecycle over a scripted transport:
// authorization outcomes, capture and cancellation ordering, the
// redirect flow, and the error taxonomy the gateway can produce.

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use rust_decimal_macros::dec;

use cielo::transactions::{
    CardBrand, Order, PaymentSource, PaymentTerms, RawCardData, Transaction, TransactionService,
    TransactionStatus,
};
use cielo::{CieloError, Environment, Merchant};

fn service(transport: &FakeTransport) -> TransactionService<FakeTransport> {
    TransactionService::with_transport(
        Merchant::new("1006993069", "25fbb99741c739dd84d7b06ec78c9bac"),
        Environment::Sandbox,
        transport.clone(),
    )
}

fn card_request() -> cielo::transactions::TransactionRequest {
    cielo::transactions::TransactionRequest::new(
        Order::new("7DSD163AHBPL1", dec!(1.00)).unwrap(),
        PaymentTerms::cash(CardBrand::Visa),
        PaymentSource::RawCard(
            RawCardData::new("4012001037141112", "JOAO DA SILVA", "123", 1, 2099).unwrap(),
        ),
    )
    .unwrap()
}

#[tokio::test]
async fn authorize_capture_cancel_lifecycle() {
    let transport = FakeTransport::new()
        .with_reply(&authorized_reply("TID1"))
        .with_reply(&captured_reply("TID1"))
        .with_reply(&cancelled_reply("TID1"));
    let service = service(&transport);

    let mut transaction = service.authorize(&card_request()).await.unwrap();
    assert_eq!(transaction.status(), Some(TransactionStatus::Authorized));
    assert_eq!(transaction.tid(), Some("TID1"));
    assert!(transaction.is_authorized());
    assert!(!transaction.is_captured());
    assert!(!transaction.is_cancelled());

    service.capture(&mut transaction).await.unwrap();
    assert_eq!(transaction.status(), Some(TransactionStatus::Captured));
    assert!(transaction.is_captured());
    assert!(transport.last_sent().unwrap().contains("<requisicao-captura"));

    service.cancel(&mut transaction, dec!(1.00)).await.unwrap();
    assert_eq!(transaction.status(), Some(TransactionStatus::Cancelled));
    assert!(transaction.is_cancelled());
    assert_eq!(transaction.cancellations().len(), 1);
    assert_eq!(transport.sent_count(), 3);
}

#[tokio::test]
async fn auto_capture_sets_both_flags() {
    let transport = FakeTransport::new().with_reply(&captured_reply("TID2"));
    let service = service(&transport);

    let mut request = card_request();
    request.terms.capture = true;
    let transaction = service.authorize(&request).await.unwrap();

    assert!(transaction.is_authorized());
    assert!(transaction.is_captured());
    assert!(transport.last_sent().unwrap().contains("<capturar>true</capturar>"));
}

#[tokio::test]
async fn declined_authorization_is_a_normal_outcome() {
    let transport = FakeTransport::new().with_reply(&declined_reply(
        "TID3",
        "57",
        "Transação não autorizada. Contate seu banco emissor.",
    ));
    let service = service(&transport);

    let transaction = service.authorize(&card_request()).await.unwrap();

    assert!(!transaction.is_authorized());
    assert!(!transaction.is_captured());
    assert_eq!(
        transaction.status().unwrap().description(),
        "Não autorizada"
    );
    let reason = transaction.decline().expect("decline reason");
    assert_eq!(reason.code, "57");
    assert!(reason.message.contains("banco emissor"));
}

#[tokio::test]
async fn double_capture_fails_locally_without_a_network_call() {
    let transport = FakeTransport::new()
        .with_reply(&authorized_reply("TID4"))
        .with_reply(&captured_reply("TID4"));
    let service = service(&transport);

    let mut transaction = service.authorize(&card_request()).await.unwrap();
    service.capture(&mut transaction).await.unwrap();
    assert_eq!(transport.sent_count(), 2);

    let result = service.capture(&mut transaction).await;
    assert!(matches!(result, Err(CieloError::Logic(_))));
    assert_eq!(transport.sent_count(), 2);
}

#[tokio::test]
async fn capture_without_authorization_or_tid_fails_locally() {
    let transport = FakeTransport::new();
    let service = service(&transport);

    let mut transaction = Transaction::new();
    let result = service.capture(&mut transaction).await;

    assert!(matches!(result, Err(CieloError::Logic(_))));
    assert_eq!(transport.sent_count(), 0);
}

#[tokio::test]
async fn capture_of_declined_transaction_fails_locally() {
    let transport = FakeTransport::new().with_reply(&declined_reply("TID5", "57", "recusada"));
    let service = service(&transport);

    let mut transaction = service.authorize(&card_request()).await.unwrap();
    let result = service.capture(&mut transaction).await;

    assert!(matches!(result, Err(CieloError::Logic(_))));
    assert_eq!(transport.sent_count(), 1);
}

#[tokio::test]
async fn capture_works_with_an_explicit_tid() {
    let transport = FakeTransport::new().with_reply(&captured_reply("TID-ELSEWHERE"));
    let service = service(&transport);

    let mut transaction = Transaction::with_tid("TID-ELSEWHERE");
    service.capture(&mut transaction).await.unwrap();

    assert!(transaction.is_captured());
    assert!(transport
        .last_sent()
        .unwrap()
        .contains("<tid>TID-ELSEWHERE</tid>"));
}

#[tokio::test]
async fn cancel_of_cancelled_transaction_surfaces_gateway_code_041() {
    let transport = FakeTransport::new()
        .with_reply(&captured_reply("TID6"))
        .with_reply(&cancelled_reply("TID6"))
        .with_reply(&erro_reply(
            "041",
            "Transação com o Tid [TID6] já está cancelada.",
        ));
    let service = service(&transport);

    let mut request = card_request();
    request.terms.capture = true;
    let mut transaction = service.authorize(&request).await.unwrap();
    service.cancel(&mut transaction, dec!(1.00)).await.unwrap();
    assert!(transaction.is_cancelled());

    // the gateway is authoritative: the second cancel is sent, not blocked
    let result = service.cancel(&mut transaction, dec!(1.00)).await;
    assert_eq!(transport.sent_count(), 3);
    match result {
        Err(CieloError::Gateway { code, message, raw }) => {
            assert_eq!(code, "041");
            assert!(message.contains("não permite cancelamento"));
            assert!(raw.is_some());
        }
        other => panic!("expected gateway error 041, got {:?}", other),
    }
    assert!(transaction.is_cancelled());
}

#[tokio::test]
async fn over_cancellation_surfaces_gateway_code_043() {
    let transport = FakeTransport::new()
        .with_reply(&captured_reply("TID7"))
        .with_reply(&erro_reply(
            "043",
            "Não é possível cancelar a transação: valor de cancelamento é maior que valor capturado.",
        ));
    let service = service(&transport);

    let mut request = card_request();
    request.terms.capture = true;
    let mut transaction = service.authorize(&request).await.unwrap();

    let result = service.cancel(&mut transaction, dec!(5.00)).await;
    assert_eq!(result.as_ref().err().and_then(|e| e.gateway_code()), Some("043"));
    // flags unchanged by the rejected cancellation
    assert!(transaction.is_captured());
    assert!(!transaction.is_cancelled());
}

#[tokio::test]
async fn unknown_error_code_keeps_the_gateway_message() {
    let transport = FakeTransport::new().with_reply(&erro_reply("777", "mensagem desconhecida"));
    let service = service(&transport);

    let result = service.authorize(&card_request()).await;
    match result {
        Err(CieloError::Gateway { code, message, .. }) => {
            assert_eq!(code, "777");
            assert_eq!(message, "mensagem desconhecida");
        }
        other => panic!("expected gateway error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_reply_preserves_flags_and_diagnostics() {
    let html = "<HTML><HEAD><TITLE>Weblogic Bridge Message</TITLE></HEAD><BODY>\
                No backend server available for connection</BODY></HTML";
    let transport = FakeTransport::new()
        .with_reply(&authorized_reply("TID8"))
        .with_status_reply(503, html);
    let service = service(&transport);

    let mut transaction = service.authorize(&card_request()).await.unwrap();
    assert!(transaction.is_authorized());

    let result = service.capture(&mut transaction).await;
    match result {
        Err(CieloError::ResponseFormat {
            http_status, body, ..
        }) => {
            assert_eq!(http_status, 503);
            assert_eq!(body, html);
        }
        other => panic!("expected response format error, got {:?}", other),
    }
    // the record still reflects the last valid reply
    assert!(transaction.is_authorized());
    assert!(!transaction.is_captured());
    assert_eq!(transaction.status(), Some(TransactionStatus::Authorized));
}

#[tokio::test]
async fn transport_timeout_is_distinguishable_and_leaves_state_alone() {
    let service = TransactionService::with_transport(
        Merchant::new("1006993069", "key"),
        Environment::Sandbox,
        TimeoutTransport,
    );

    let mut transaction = Transaction::with_tid("TID9");
    let result = service.refresh(&mut transaction).await;

    assert!(matches!(result, Err(CieloError::Transport(_))));
    assert_eq!(transaction.status(), None);
}

#[tokio::test]
async fn redirect_flow_resolves_through_refresh() {
    let authentication_url = "https://qasecommerce.cielo.com.br/web/index.cbmp?id=abc123";
    let transport = FakeTransport::new()
        .with_reply(&created_reply("TID10", authentication_url))
        .with_reply(&in_progress_reply("TID10"))
        .with_reply(&authorized_reply("TID10"));
    let service = service(&transport);

    let mut request = card_request();
    request.terms.return_url = Some("http://localhost:7777/orders/7DSD163AHBPL1/".to_string());
    let mut transaction = service.authorize(&request).await.unwrap();

    // created: neither success nor failure, cardholder must authenticate
    assert_eq!(transaction.status(), Some(TransactionStatus::Created));
    assert!(transaction.status().unwrap().is_pending());
    assert!(!transaction.is_authorized());
    assert!(transaction.decline().is_none());
    assert_eq!(transaction.authentication_url(), Some(authentication_url));

    service.refresh(&mut transaction).await.unwrap();
    assert_eq!(transaction.status().unwrap().description(), "Em andamento");
    assert!(transaction.status().unwrap().is_pending());

    service.refresh(&mut transaction).await.unwrap();
    assert!(transaction.is_authorized());
}

#[tokio::test]
async fn refresh_works_for_a_transaction_known_only_by_tid() {
    let transport = FakeTransport::new().with_reply(&captured_reply("TID11"));
    let service = service(&transport);

    let mut transaction = Transaction::with_tid("TID11");
    service.refresh(&mut transaction).await.unwrap();

    assert!(transaction.is_authorized());
    assert!(transaction.is_captured());
    assert!(transport
        .last_sent()
        .unwrap()
        .contains("<requisicao-consulta"));
}

#[tokio::test]
async fn refresh_without_tid_fails_locally() {
    let transport = FakeTransport::new();
    let service = service(&transport);

    let mut transaction = Transaction::new();
    let result = service.refresh(&mut transaction).await;

    assert!(matches!(result, Err(CieloError::Logic(_))));
    assert_eq!(transport.sent_count(), 0);
}

#[tokio::test]
async fn auto_tokenizing_authorization_exposes_the_issued_token() {
    let transport = FakeTransport::new().with_reply(&tokenized_capture_reply(
        "TID12",
        "zwAEf9pjznPteWQC/DjP4/m6j/d9LdWsvtjDWZSKhiQ=",
        "401200******1112",
    ));
    let service = service(&transport);

    let mut request = card_request();
    request.terms.capture = true;
    request.terms.tokenize = true;
    let transaction = service.authorize(&request).await.unwrap();

    assert!(transport
        .last_sent()
        .unwrap()
        .contains("<gerar-token>true</gerar-token>"));
    let token = transaction.issued_token().expect("issued token");
    assert_eq!(token.token, "zwAEf9pjznPteWQC/DjP4/m6j/d9LdWsvtjDWZSKhiQ=");
    assert_eq!(token.truncated_pan.as_deref(), Some("401200******1112"));
}

#[tokio::test]
async fn partial_cancellation_keeps_the_transaction_captured() {
    let partial = "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\
        <transacao xmlns=\"http://ecommerce.cbmp.com.br\" versao=\"1.2.1\">\
        <tid>TID13</tid><pan>IqVz7P9zaIgTYdU=</pan><status>6</status>\
        <cancelamentos><cancelamento><codigo>6</codigo>\
        <data-hora>2026-08-06T12:00:01</data-hora>\
        <mensagem>Cancelamento parcial realizado com sucesso</mensagem>\
        <valor>50</valor></cancelamento></cancelamentos></transacao>";
    let transport = FakeTransport::new()
        .with_reply(&captured_reply("TID13"))
        .with_reply(partial);
    let service = service(&transport);

    let mut request = card_request();
    request.terms.capture = true;
    let mut transaction = service.authorize(&request).await.unwrap();

    service.cancel(&mut transaction, dec!(0.5)).await.unwrap();
    assert!(transport.last_sent().unwrap().contains("<valor>50</valor>"));
    assert!(transaction.is_captured());
    assert!(!transaction.is_cancelled());

    let history = transaction.cancellations();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount_cents, "50");
    assert!(history[0].message.contains("parcial"));
}
