//! Human-readable text for tool results, the dashboard and the CLI.
//!
//! Everything that turns a typed result or an [`AppError`] into text lives
//! here, so the lower layers never format messages for people.

use crate::booking::OperatingWindow;
use crate::pdf::{Answer, LoadOutcome, LoadedPdf, PdfSummary};
use crate::tools::weather::WeatherReport;
use crate::types::{AppError, Availability, BookingSummary, ConfirmedBooking, Turf};

const RULE_WIDTH: usize = 40;

/// Whole amounts print without decimals, anything else with two.
pub fn amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Hours with at most two decimals, trailing zeros dropped.
pub fn hours(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// `12345` becomes `12,345`.
pub fn thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

pub fn turf_list(turfs: &[Turf], currency: &str) -> String {
    if turfs.is_empty() {
        return "No turfs available".to_string();
    }

    let mut out = String::from("🏟️ Available Turfs:\n\n");
    for turf in turfs {
        out.push_str(&format!("ID: {}\n", turf.id));
        out.push_str(&format!("Name: {}\n", turf.name));
        out.push_str(&format!("Location: {}\n", turf.location));
        out.push_str(&format!("Rate: {}{}/hour\n", currency, amount(turf.hourly_rate)));
        out.push_str(&format!("Capacity: {} players\n", turf.capacity));
        out.push_str(&format!("Facilities: {}\n", turf.facilities));
        out.push_str(&rule());
        out.push('\n');
    }
    out
}

pub fn booking_list(bookings: &[BookingSummary], currency: &str) -> String {
    if bookings.is_empty() {
        return "No bookings found".to_string();
    }

    let mut out = String::from("📅 All Bookings:\n\n");
    for booking in bookings {
        out.push_str(&format!("Booking ID: {}\n", booking.id));
        out.push_str(&format!("Turf: {}\n", booking.turf_name));
        out.push_str(&format!("Date: {}\n", booking.booking_date));
        out.push_str(&format!(
            "Time: {} - {}\n",
            booking.start_time, booking.end_time
        ));
        out.push_str(&format!("Cost: {}{}\n", currency, amount(booking.total_cost)));
        out.push_str(&format!("Status: {}\n", booking.status));
        out.push_str(&rule());
        out.push('\n');
    }
    out
}

pub fn availability(avail: &Availability, window: &OperatingWindow, currency: &str) -> String {
    let mut out = format!("🏟️ {} - {}\n", avail.turf.name, avail.turf.location);
    out.push_str(&format!(
        "📅 Availability for {}\n",
        crate::booking::format_date(avail.date)
    ));
    out.push_str(&format!(
        "💰 Rate: {}{}/hour\n\n",
        currency,
        amount(avail.turf.hourly_rate)
    ));

    if avail.is_fully_available() {
        out.push_str(&format!("✅ Fully Available ({})", window.label()));
        return out;
    }

    out.push_str("🔴 Booked Slots:\n");
    for (start, end) in &avail.bookings {
        out.push_str(&format!("• {} - {}\n", start, end));
    }

    out.push_str("\n✅ Available Slots:\n");
    if avail.available.is_empty() {
        out.push_str("No slots available");
    } else {
        for slot in &avail.available {
            out.push_str(&format!("• {}\n", slot.label()));
        }
    }
    out
}

pub fn confirmation(confirmed: &ConfirmedBooking, currency: &str) -> String {
    let b = &confirmed.booking;
    let mut out = String::from("✅ Booking Confirmed!\n\n");
    out.push_str(&format!("Booking ID: {}\n", b.id));
    out.push_str(&format!("Turf: {}\n", confirmed.turf_name));
    out.push_str(&format!(
        "Customer: {} ({})\n",
        b.customer_name, b.customer_phone
    ));
    out.push_str(&format!("Date: {}\n", b.booking_date));
    out.push_str(&format!("Time: {} - {}\n", b.start_time, b.end_time));
    out.push_str(&format!(
        "Duration: {} hours\n",
        hours(confirmed.duration_hours)
    ));
    out.push_str(&format!("Total Cost: {}{}\n", currency, amount(b.total_cost)));
    out
}

pub fn weather(report: &WeatherReport) -> String {
    [
        format!(
            "🌤️ Weather Report for {}, {}, {}",
            report.name, report.region, report.country
        ),
        format!(
            "🌡️ Temperature: {}°C ({}°F)",
            report.temp_c, report.temp_f
        ),
        format!("☁️ Condition: {}", report.condition),
        format!("💨 Wind: {} km/h ({})", report.wind_kph, report.wind_dir),
        format!("💧 Humidity: {}%", report.humidity),
        format!("👁️ Visibility: {} km", report.vis_km),
        format!("🕐 Local Time: {}", report.localtime),
    ]
    .join("\n")
}

pub fn pdf_loaded(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::AlreadyLoaded {
            file_name, words, ..
        } => format!(
            "✅ PDF already loaded!\n📄 File: {}\n📝 Words: {}\n💾 Status: Ready for questions",
            file_name,
            thousands(*words)
        ),
        LoadOutcome::Loaded {
            file_name,
            pages,
            words,
            preview,
            ..
        } => format!(
            "✅ PDF loaded successfully!\n📄 File: {}\n📊 Pages: {}\n📝 Words: {}\n💾 Status: Cached and ready\n\n📝 Preview:\n{}",
            file_name,
            pages,
            thousands(*words),
            preview
        ),
    }
}

pub fn pdf_answer(answer: &Answer) -> String {
    match answer {
        Answer::Sections {
            question,
            total,
            sections,
        } => {
            let mut out = format!(
                "📖 Found {} relevant section(s) for: '{}'\n\n",
                total, question
            );
            for (i, section) in sections.iter().enumerate() {
                out.push_str(&format!("🔍 Section {}:\n{}\n\n", i + 1, section));
            }
            out.trim_end().to_string()
        }
        Answer::Fallback { question, lines } => format!(
            "📖 No specific match found for '{}', but here's the document content:\n\n{}",
            question,
            lines.join("\n")
        ),
    }
}

pub fn pdf_list(loaded: &[LoadedPdf]) -> String {
    if loaded.is_empty() {
        return "📭 No PDF files currently loaded.".to_string();
    }

    let mut out = format!("📚 Currently loaded PDF files ({}):\n\n", loaded.len());
    for (i, pdf) in loaded.iter().enumerate() {
        out.push_str(&format!(
            "{}. 📄 {}\n   📊 {} words, {} characters\n   📁 {}\n\n",
            i + 1,
            pdf.file_name,
            thousands(pdf.words),
            thousands(pdf.chars),
            pdf.path
        ));
    }
    out.trim_end().to_string()
}

pub fn pdf_cleared() -> String {
    "🗑️ PDF cache cleared successfully!".to_string()
}

pub fn pdf_summary(summary: &PdfSummary) -> String {
    let mut out = format!("📋 Summary of {}:\n\n", summary.file_name);
    out.push_str(&format!(
        "📊 Statistics: {} words, {} characters, {} pages\n\n",
        thousands(summary.words),
        thousands(summary.chars),
        summary.pages
    ));
    out.push_str("📝 Content Overview:\n");
    out.push_str(
        &summary
            .lines
            .iter()
            .map(|line| format!("• {}", line))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    out
}

/// The one place an error becomes user-facing text.
pub fn render_error(err: &AppError) -> String {
    match err {
        AppError::Database(_) | AppError::Internal(_) => {
            format!("❌ Something went wrong: {}", err.detail())
        }
        AppError::LLM(detail) => format!("❌ Model request failed: {}", detail),
        _ => format!("❌ {}", err.detail()),
    }
}
