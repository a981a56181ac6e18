use dioxus::prelude::*;
use spotguess_shared::game::{GameSummary, RoundResult, Verdict};

use crate::components::map_view::format_distance;

fn verdict_message(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Good => "Nice work, you know these maps!",
        Verdict::NeedsPractice => "Keep practicing, the callouts will stick.",
    }
}

fn format_accuracy(percent: f64) -> String {
    format!("{:.0}%", percent)
}

/// Short per-round line for the summary table.
fn round_line(result: &RoundResult) -> String {
    format!(
        "Round {}: {} pts ({})",
        result.round,
        result.score,
        format_distance(result.distance_meters)
    )
}

/// Outcome of the round that was just validated.
#[component]
pub fn RoundResultPanel(
    score: u32,
    distance_meters: f64,
    callout: String,
    is_last_round: bool,
    on_next: EventHandler<()>,
) -> Element {
    let distance = format_distance(distance_meters);
    let next_label = if is_last_round { "See results" } else { "Next round" };
    rsx! {
        div { class: "panel round-result",
            h3 { "{callout}" }
            div { class: "result-row",
                span { class: "result-label", "Score" }
                span { class: "result-value", "{score}" }
            }
            div { class: "result-row",
                span { class: "result-label", "Distance" }
                span { class: "result-value", "{distance}" }
            }
            button {
                class: "primary",
                onclick: move |_| on_next.call(()),
                "{next_label}"
            }
        }
    }
}

#[component]
pub fn GameSummaryView(
    summary: GameSummary,
    on_restart: EventHandler<()>,
    on_menu: EventHandler<()>,
) -> Element {
    let accuracy = format_accuracy(summary.average_accuracy);
    let message = verdict_message(summary.verdict);
    let lines: Vec<String> = summary.rounds.iter().map(round_line).collect();
    rsx! {
        div { class: "panel game-summary",
            h2 { "Game over" }
            div { class: "summary-total",
                "{summary.total_score} / {summary.max_possible_score}"
            }
            div { class: "summary-accuracy", "Average accuracy: {accuracy}" }
            p { class: "summary-verdict", "{message}" }
            ul { class: "summary-rounds",
                for line in lines {
                    li { "{line}" }
                }
            }
            div { class: "summary-actions",
                button { class: "primary", onclick: move |_| on_restart.call(()), "Play again" }
                button { onclick: move |_| on_menu.call(()), "Back to menu" }
            }
        }
    }
}
