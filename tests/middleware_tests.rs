use actix_web::{test, web, App, HttpRequest, HttpResponse};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crewcall::middleware::{RequestIdExt, RequestIdMiddleware};

async fn echo_correlation(req: HttpRequest) -> HttpResponse {
    match req.correlation_id() {
        Some(id) => HttpResponse::Ok().body(id),
        None => HttpResponse::InternalServerError().finish(),
    }
}

#[actix_rt::test]
async fn generates_a_correlation_id_when_none_is_sent() {
    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .route("/ping", web::get().to(echo_correlation)),
    )
    .await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
    assert!(res.status().is_success());

    let header = res
        .headers()
        .get("x-correlation-id")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap();
    assert!(Uuid::parse_str(&header).is_ok());

    let body = test::read_body(res).await;
    assert_eq!(header.as_bytes(), body.as_ref());
}

#[actix_rt::test]
async fn echoes_a_caller_supplied_correlation_id() {
    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .route("/ping", web::get().to(echo_correlation)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/ping")
        .insert_header(("x-correlation-id", "load-in-42"))
        .to_request();
    let res = test::call_service(&app, req).await;

    let header = res
        .headers()
        .get("x-correlation-id")
        .and_then(|h| h.to_str().ok())
        .unwrap();
    assert_eq!(header, "load-in-42");

    let body = test::read_body(res).await;
    assert_eq!(body.as_ref(), b"load-in-42");
}
