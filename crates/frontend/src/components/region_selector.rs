use std::collections::BTreeSet;

use dioxus::prelude::*;
use spotguess_shared::models::Region;

/// Flip a region in or out of the selection.
pub fn toggle_region(selection: &mut BTreeSet<String>, file_name: &str) {
    if !selection.remove(file_name) {
        selection.insert(file_name.to_string());
    }
}

#[component]
pub fn RegionSelector(regions: Vec<Region>, selected: Signal<BTreeSet<String>>) -> Element {
    let current = selected.read().clone();
    let all_selected = !regions.is_empty() && regions.iter().all(|r| current.contains(&r.file_name));
    let all_names: Vec<String> = regions.iter().map(|r| r.file_name.clone()).collect();

    rsx! {
        div { class: "panel",
            h3 { "Maps" }
            div { class: "region-grid",
                for r in regions {
                    button {
                        key: "{r.file_name}",
                        class: if current.contains(&r.file_name) { "active" } else { "" },
                        onclick: {
                            let name = r.file_name.clone();
                            move |_| toggle_region(&mut selected.write(), &name)
                        },
                        "{r.display_name}"
                    }
                }
            }
            button {
                class: "select-all",
                onclick: move |_| {
                    if all_selected {
                        selected.write().clear();
                    } else {
                        selected.set(all_names.iter().cloned().collect());
                    }
                },
                if all_selected { "Clear" } else { "Select all" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_region_adds_then_removes() {
        let mut s = BTreeSet::new();
        toggle_region(&mut s, "ascent");
        assert!(s.contains("ascent"));
        toggle_region(&mut s, "ascent");
        assert!(s.is_empty());
    }
}
