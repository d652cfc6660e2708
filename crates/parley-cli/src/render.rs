//! Terminal rendering for session output.

use colored::{ColoredString, Colorize};
use parley_core::persona::PersonaRole;
use parley_core::scorecard::ScoreCard;
use parley_core::session::{Ending, EndingCategory, RespondentReply, SessionState};

const BAR_WIDTH: usize = 16;

fn bar(value: i32, filled_color: fn(&str) -> ColoredString) -> String {
    let filled = ((value.clamp(0, 100) as usize) * BAR_WIDTH) / 100;
    format!(
        "[{}{}]",
        filled_color(&"█".repeat(filled)),
        "░".repeat(BAR_WIDTH - filled).bright_black()
    )
}

fn role_color(role: PersonaRole, text: &str) -> ColoredString {
    match role {
        PersonaRole::Executive => text.red(),
        PersonaRole::TechLead => text.blue(),
        PersonaRole::Hr => text.magenta(),
        PersonaRole::Product => text.cyan(),
        PersonaRole::Employee => text.yellow(),
        PersonaRole::Intern => text.green(),
    }
}

pub fn status(state: &SessionState) {
    println!();
    println!(
        "{}",
        format!("  round {}/{}", state.round, state.total_rounds).bold()
    );
    println!(
        "  stress     {} {:>3}%",
        bar(state.stress, |s| s.red()),
        state.stress
    );
    println!(
        "  confidence {} {:>3}%",
        bar(state.confidence, |s| s.green()),
        state.confidence
    );
    println!();
}

pub fn reply(reply: &RespondentReply) {
    let header = format!("[{}]", reply.name);
    println!("{} {}", role_color(reply.role, &header).bold(), reply.text);
    println!("{}", format!("    ({})", reply.mood).bright_black());
}

pub fn event(text: &str) {
    println!("{}", format!("  ── {text} ──").bright_black());
    println!();
}

pub fn ending(ending: &Ending) {
    let title = match ending.category {
        EndingCategory::Success => ending.title.green().bold(),
        EndingCategory::Collapse => ending.title.red().bold(),
        EndingCategory::Abandoned => ending.title.yellow().bold(),
        EndingCategory::Ambiguous | EndingCategory::Rejection => ending.title.white().bold(),
    };
    println!();
    println!("  {} {}", "===".bright_black(), title);
    println!("  {}", ending.description);
    println!();
}

pub fn scorecard(card: &ScoreCard, roster: &parley_core::persona::Roster) {
    println!("{}", "  session scorecard".bold());
    println!("  messages: {}", card.total_messages);
    if let Some(top) = card.top_contributor {
        let name = roster.get(top).map(|p| p.name.as_str()).unwrap_or("?");
        let count = card.messages_per_persona.get(&top).copied().unwrap_or(0);
        println!("  loudest voice: {name} ({count} messages)");
    }
    println!("  hollow reassurances: {}", card.reassurance_count);
    println!("  jargon density: {}%", card.jargon_density);
    println!("  interruptions: {}", card.interruption_count);
    println!("  decisions made: {}", card.effective_decisions);
    if let Some(quote) = &card.quotable_line {
        println!("  quote of the day: {} — \"{}\"", quote.speaker, quote.text);
    }
    let stars = "★".repeat(card.rating as usize);
    let hollow = "☆".repeat(5 - card.rating as usize);
    println!("  rating: {}{}", stars.yellow(), hollow.bright_black());
    println!("  {}", card.closing_line.italic());
    println!();
}

pub fn help() {
    println!();
    println!("{}", "commands:".bold());
    println!("  /status   show the stress and confidence bars");
    println!("  /quit     walk out of the session");
    println!("  /help     this list");
    println!();
}
