use std::time::Duration;

use actix_web::http::header::ContentType;
use actix_web::web;
use actix_web::HttpResponse;
use serde::Deserialize;
use serde::Serialize;
use tera::Context;
use tera::Tera;

use crate::configuration::LandingSettings;
use crate::form::FormState;
use crate::form::SUBSCRIBED_MESSAGE;
use crate::ui::InfoModal;
use crate::ui::NavDrawer;
use crate::ui::Rotator;
use crate::ui::FEATURES;
use crate::ui::HEADLINE_WORDS;
use crate::ui::NAV_LINKS;
use crate::utils::error_500;

const TITLE: &str = "Engineers Hub - Coming Soon";
const DESCRIPTION: &str =
    "Connect. Collaborate. Innovate. The premier social platform for engineers worldwide.";

/// Everything needed to render `/`, built once at startup and shared by all
/// workers. The rotators tick for as long as the server is up.
pub struct LandingPage {
    templates: Tera,
    headline: Rotator,
    features: Rotator,
    rotation: Duration,
    pub success_dismiss: Duration,
}

impl LandingPage {
    /// Must be called from within a tokio runtime (the rotators spawn tasks)
    pub fn new(settings: &LandingSettings) -> Result<Self, tera::Error> {
        let mut templates = Tera::default();
        // path relative to this file (checked at compile time!)
        templates.add_raw_template("home.html", include_str!("./home.html"))?;
        Ok(Self {
            templates,
            headline: Rotator::spawn(HEADLINE_WORDS, settings.rotation_period()),
            features: Rotator::spawn(FEATURES, settings.rotation_period()),
            rotation: settings.rotation_period(),
            success_dismiss: settings.success_dismiss(),
        })
    }

    /// `.html` templates are autoescaped by tera, so store messages and user
    /// input can go in as-is
    pub fn render(
        &self,
        form: &FormState,
        drawer: NavDrawer,
        modal: InfoModal,
    ) -> Result<String, tera::Error> {
        let highlighted = self.features.index();
        let word = self.headline.index();
        let view = PageView {
            title: TITLE,
            description: DESCRIPTION,
            headline: self.headline.items().get(word).copied().unwrap_or_default(),
            headline_words: self.headline.items(),
            headline_index: word,
            feature_index: highlighted,
            rotation_ms: self.rotation.as_millis() as u64,
            features: self
                .features
                .items()
                .iter()
                .copied()
                .enumerate()
                .map(|(i, text)| FeatureCard {
                    text,
                    highlighted: i == highlighted,
                })
                .collect(),
            nav_links: NAV_LINKS
                .iter()
                .copied()
                .map(|label| NavLink {
                    label,
                    href: InfoModal::nav_link_href(),
                })
                .collect(),
            drawer,
            drawer_toggle_href: drawer.toggle_href(),
            drawer_backdrop_href: drawer.outside_click_href(),
            modal,
            modal_close_href: InfoModal::close_href(),
            form,
            subscribed_message: SUBSCRIBED_MESSAGE,
            success_dismiss_ms: self.success_dismiss.as_millis() as u64,
        };
        self.templates
            .render("home.html", &Context::from_serialize(&view)?)
    }
}

#[derive(Serialize)]
struct FeatureCard {
    text: &'static str,
    highlighted: bool,
}

#[derive(Serialize)]
struct NavLink {
    label: &'static str,
    href: &'static str,
}

#[derive(Serialize)]
struct PageView<'a> {
    title: &'static str,
    description: &'static str,
    headline: &'static str,
    headline_words: &'static [&'static str],
    headline_index: usize,
    feature_index: usize,
    rotation_ms: u64,
    features: Vec<FeatureCard>,
    nav_links: Vec<NavLink>,
    drawer: NavDrawer,
    drawer_toggle_href: &'static str,
    drawer_backdrop_href: &'static str,
    modal: InfoModal,
    modal_close_href: &'static str,
    form: &'a FormState,
    subscribed_message: &'static str,
    success_dismiss_ms: u64,
}

#[derive(Deserialize)]
pub struct PageQuery {
    menu: Option<String>,
    modal: Option<String>,
}

/// `GET /`
///
/// Always renders an idle form; `?menu=open` and `?modal=info` open the
/// drawer and the modal respectively.
pub async fn home(
    query: web::Query<PageQuery>,
    page: web::Data<LandingPage>,
) -> Result<HttpResponse, actix_web::Error> {
    let drawer = NavDrawer::from_query(query.menu.as_deref());
    let modal = InfoModal::from_query(query.modal.as_deref());
    let body = page
        .render(&FormState::default(), drawer, modal)
        .map_err(error_500)?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}
