use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use dv_mechanics::ActionKind;

pub fn run(rules: Option<&str>, json: bool) -> Result<(), String> {
    let rules = super::load_rules(rules)?;

    if json {
        let out = rules.to_json().map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    println!(
        "  {} {}",
        "Ruleset".bold(),
        format!("'{}' (guard bonus +{})", rules.name, rules.guard_bonus).dimmed()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Action",
        "Card",
        "Target",
        "Reach",
        "Minor",
        "Fate",
        "Difficulty",
        "Wound steps",
    ]);

    let yes_no = |b: bool| if b { "yes" } else { "--" }.to_string();
    for &kind in ActionKind::all() {
        let spec = kind.spec();
        let policy = rules.policy(kind);
        let reach = if spec.is_melee {
            "same zone".to_string()
        } else if spec.max_steps > 0 {
            format!("{} zone{}", spec.max_steps, if spec.max_steps == 1 { "" } else { "s" })
        } else {
            "--".to_string()
        };
        let steps = policy
            .wound_steps
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("/");
        table.add_row(vec![
            kind.to_string(),
            yes_no(spec.requires_card),
            spec.target_type.to_string(),
            reach,
            yes_no(spec.minor_allowed),
            yes_no(spec.test_of_fate),
            policy.difficulty.to_string(),
            steps,
        ]);
    }

    println!("{table}");
    Ok(())
}
