use colored::Colorize;
use shelf::commands::stats::Stats;
use shelf::commands::{CmdMessage, MessageLevel};
use shelf::model::{Item, Patron};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const KEY_WIDTH: usize = 16;
const TITLE_WIDTH: usize = 36;
const CREATOR_WIDTH: usize = 22;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// Load problems go to stderr so they never mix with command output.
pub(super) fn print_load_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {}", "Warning:".yellow(), warning);
    }
}

pub(super) fn print_items(items: &[Item]) {
    for item in items {
        let copies = format!("{}/{}", item.available_copies(), item.total_copies());
        let copies = if item.is_available() {
            copies.green()
        } else {
            copies.red()
        };
        println!(
            "{} {} {} {:>4}  {}",
            fit(item.key(), KEY_WIDTH).yellow(),
            fit(&item.title, TITLE_WIDTH).bold(),
            fit(&item.creator, CREATOR_WIDTH),
            item.year,
            copies
        );
    }
}

pub(super) fn print_item_detail(item: &Item) {
    println!("{} {}", item.key().yellow(), item.title.bold());
    println!("--------------------------------");
    println!("Creator:   {}", item.creator);
    println!("Category:  {}", item.category);
    println!("Year:      {}", item.year);
    println!(
        "Copies:    {} available of {}",
        item.available_copies(),
        item.total_copies()
    );
    let waiting: Vec<&str> = item.waitlist().collect();
    if waiting.is_empty() {
        println!("Waitlist:  {}", "empty".dimmed());
    } else {
        println!("Waitlist:  {}", waiting.join(", "));
    }
}

pub(super) fn print_patron_detail(patron: &Patron) {
    println!("{} {} ({})", patron.key().yellow(), patron.name.bold(), patron.role());
    println!("--------------------------------");
    println!("Username:  {}", patron.username);
    if !patron.email.is_empty() {
        println!("Email:     {}", patron.email);
    }
    println!(
        "Loans:     {} of {}",
        patron.active_loans().len(),
        patron.quota()
    );
    println!("Borrowed:  {} time(s) in total", patron.history().len());
}

pub(super) fn print_stats(stats: &Stats) {
    println!("{}", "Catalog statistics".bold());
    println!("--------------------------------");
    match &stats.most_borrowed {
        Some(item) => println!(
            "Most borrowed item:  {} ({} out)",
            item.title,
            item.borrowed_copies()
        ),
        None => println!("Most borrowed item:  {}", "-".dimmed()),
    }
    match &stats.most_active {
        Some(patron) => println!(
            "Most active patron:  {} ({} loans)",
            patron.name,
            patron.history().len()
        ),
        None => println!("Most active patron:  {}", "-".dimmed()),
    }
    println!("Total items:         {}", stats.total_items);
    println!("Total patrons:       {}", stats.total_patrons);
    println!("Copies on loan:      {}", stats.copies_out);
}

/// Pads or truncates `text` to exactly `width` terminal columns.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        let padding = width - text.width();
        return format!("{}{}", text, " ".repeat(padding));
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
