//! HTTP front end: one handler per page, each building its page state fresh
//! from the request.

use crate::api::ApiClient;
use crate::config::Config;
use crate::navigation::{take_handoff, Route};
use crate::pages::analytics::{self, AnalyticsData, AnalyticsPage};
use crate::pages::batch::{template_csv, BatchPage};
use crate::pages::home::ServiceBadge;
use crate::pages::predict::{PredictPage, SubmitOutcome, ACTION_FIELD, RESET_ACTION};
use crate::pages::results::ResultsView;
use crate::views;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

async fn home(api: web::Data<ApiClient>) -> HttpResponse {
    let badge = ServiceBadge::probe(&api).await;
    html(views::home_page(&badge))
}

async fn predict_form() -> HttpResponse {
    html(views::predict_page(&PredictPage::new()))
}

async fn predict_submit(
    form: web::Form<Vec<(String, String)>>,
    api: web::Data<ApiClient>,
    config: web::Data<Config>,
) -> HttpResponse {
    let fields = form.into_inner();
    let mut page = PredictPage::new();

    if fields.iter().any(|(name, value)| name == ACTION_FIELD && value == RESET_ACTION) {
        debug!("form reset");
        page.reset();
        return html(views::predict_page(&page));
    }

    page.apply_form(fields);
    match page.submit(&api, config.redirect_delay).await {
        SubmitOutcome::Navigate { after, to } => html(views::redirecting_page(&page, after, &to)),
        SubmitOutcome::Invalid | SubmitOutcome::Failed => html(views::predict_page(&page)),
    }
}

async fn results(req: HttpRequest) -> HttpResponse {
    let view = ResultsView::from_handoff(take_handoff(req.query_string()));
    if view == ResultsView::NoData {
        debug!("results requested without a prediction");
    }
    html(views::results_page(&view))
}

#[derive(Debug, Default, Deserialize)]
struct AnalyticsQuery {
    section: Option<usize>,
    step: Option<Step>,
    /// Present on the follow-up request issued by the loading view.
    load: Option<u8>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Step {
    Prev,
    Next,
}

async fn analytics_page(req: HttpRequest, api: web::Data<ApiClient>) -> HttpResponse {
    // A malformed query string lands on the first section.
    let query: AnalyticsQuery = serde_urlencoded::from_str(req.query_string()).unwrap_or_default();
    let mut page = AnalyticsPage::at(query.section.unwrap_or(0));

    match query.step {
        Some(Step::Prev) => {
            if let Some(nav) = page.previous() {
                return redirect(&nav.url());
            }
        }
        Some(Step::Next) => page.next(),
        None => {}
    }

    // First answer is the loading view; its refresh comes back with `load`.
    if query.load.is_none() {
        return html(views::analytics_page(&page));
    }
    page.fetch(&api).await;
    html(views::analytics_page(&page))
}

async fn analytics_json(api: web::Data<ApiClient>) -> HttpResponse {
    let mut page = AnalyticsPage::new();
    page.fetch(&api).await;
    match page.data() {
        AnalyticsData::Loaded(metadata) => HttpResponse::Ok().json(json!({
            "charts": analytics::charts(metadata),
            "insights": analytics::insights(metadata),
            "statistics": analytics::statistics(metadata),
        })),
        _ => HttpResponse::ServiceUnavailable().json(json!({
            "error": "No analytics data available",
        })),
    }
}

fn batch_template() -> String {
    template_csv().unwrap_or_else(|e| {
        warn!("could not build CSV template: {}", e);
        String::new()
    })
}

async fn batch_form() -> HttpResponse {
    html(views::batch_page(&BatchPage::new(), &batch_template()))
}

#[derive(Debug, Default, Deserialize)]
struct BatchForm {
    #[serde(default)]
    csv: String,
}

async fn batch_submit(form: web::Form<BatchForm>, api: web::Data<ApiClient>) -> HttpResponse {
    let mut page = BatchPage::with_csv(form.into_inner().csv);
    page.submit(&api).await;
    html(views::batch_page(&page, &batch_template()))
}

pub async fn not_found(req: HttpRequest) -> HttpResponse {
    debug!(path = req.path(), "no such page");
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(views::not_found_page(req.path()))
}

/// Registers every page route. Expects `web::Data<ApiClient>` and
/// `web::Data<Config>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(Route::Home.path(), web::get().to(home))
        .service(
            web::resource(Route::Predict.path())
                .route(web::get().to(predict_form))
                .route(web::post().to(predict_submit)),
        )
        .route(Route::Results.path(), web::get().to(results))
        .route(Route::Analytics.path(), web::get().to(analytics_page))
        .route("/analytics/charts.json", web::get().to(analytics_json))
        .service(
            web::resource(Route::Batch.path())
                .route(web::get().to(batch_form))
                .route(web::post().to(batch_submit)),
        );
}

pub async fn start_api(config: Config) -> std::io::Result<()> {
    let bind = config.bind;
    let config_data = web::Data::new(config);
    info!(%bind, api_url = %config_data.api_url, "starting web server");

    HttpServer::new(move || {
        // awc clients are per worker thread
        let api = web::Data::new(ApiClient::new(config_data.api_url.clone()));
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(api)
            .app_data(config_data.clone())
            .configure(configure)
            .default_service(web::to(not_found))
    })
    .bind(bind)?
    .run()
    .await
}
