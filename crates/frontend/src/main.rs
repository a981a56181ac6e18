mod api;
mod components;
mod coords;
mod pages;

use dioxus::prelude::*;
use spotguess_shared::{GameConfig, GameSession};

use pages::game::Game;
use pages::menu::{LastSettings, Menu};

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Menu {},
    #[route("/game")]
    Game {},
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    // One session for the whole app; both pages drive it through context
    use_context_provider(|| Signal::new(GameSession::new(GameConfig::default(), coords::random_seed())));
    use_context_provider(|| Signal::new(LastSettings::default()));

    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}
