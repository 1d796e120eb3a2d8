use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;
use tera::Context;
use uuid::Uuid;

use crate::model::QaInput;
use crate::web::models::{ContactForm, SendChatRequest};
use crate::AppState;

// Index page handler
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let context = Context::new();
    match data.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Contact form endpoint; validation failures are a normal 200 reply
pub async fn contact(
    data: web::Data<AppState>,
    form: web::Form<ContactForm>,
) -> impl Responder {
    let request_id = Uuid::new_v4();
    info!("Contact request {}", request_id);

    let state = data
        .actions
        .submit_contact_form(None, form.into_inner())
        .await;

    info!("Contact request {} success: {}", request_id, state.success);
    HttpResponse::Ok().json(state)
}

// Q&A endpoint
pub async fn ask(data: web::Data<AppState>, req: web::Json<QaInput>) -> impl Responder {
    let request_id = Uuid::new_v4();
    info!("Ask request {}: {}", request_id, req.question);

    let reply = data.actions.ask_ai(req.into_inner()).await;

    info!("Ask request {} failed: {}", request_id, reply.is_err());
    HttpResponse::Ok().json(reply)
}

// Chat endpoint; the browser owns the conversation and sends it each turn
pub async fn chat(data: web::Data<AppState>, req: web::Json<SendChatRequest>) -> impl Responder {
    let request_id = Uuid::new_v4();
    let SendChatRequest {
        current_message,
        history,
    } = req.into_inner();
    info!(
        "Chat request {}: {} ({} prior turns)",
        request_id,
        current_message,
        history.len()
    );

    let reply = data
        .actions
        .send_chat_message(current_message, &history)
        .await;

    info!("Chat request {} failed: {}", request_id, reply.is_err());
    HttpResponse::Ok().json(reply)
}
