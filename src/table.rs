use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::model::{FlightResult, SearchResponse};

pub fn format_price(price: f64, currency: &str) -> String {
    match currency {
        "USD" => format!("${price:.2}"),
        "EUR" => format!("€{price:.2}"),
        "GBP" => format!("£{price:.2}"),
        "JPY" | "CNY" => format!("¥{price:.0}"),
        "KRW" => format!("₩{price:.0}"),
        "INR" => format!("₹{price:.2}"),
        "THB" => format!("฿{price:.2}"),
        _ => format!("{price:.2} {currency}"),
    }
}

/// Price with a leading `~` when it is an estimate.
pub fn display_price(flight: &FlightResult) -> String {
    let price = format_price(flight.price, &flight.currency);
    if flight.price_estimated {
        format!("~{price}")
    } else {
        price
    }
}

pub fn format_stops(stops: u32) -> String {
    match stops {
        0 => "Nonstop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{n} stops"),
    }
}

pub fn render(response: &SearchResponse) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Airline", "Route", "Date", "Depart", "Arrive", "Duration", "Stops", "Price",
        ]);

    for flight in &response.flights {
        table.add_row(vec![
            flight.airline.clone(),
            format!("{} → {}", flight.from, flight.to),
            flight.date.clone(),
            flight.departure_time.clone(),
            flight.arrival_time.clone(),
            flight.duration.clone(),
            format_stops(flight.stops),
            display_price(flight),
        ]);
    }

    let mut out = table.to_string();
    out.push_str(&format!(
        "\n{} results from {}",
        response.meta.count, response.meta.api_used
    ));
    if response.meta.return_leg_missing {
        out.push_str(" (no return flights found)");
    }
    for line in highlight_lines(response) {
        out.push('\n');
        out.push_str(&line);
    }
    if response.flights.iter().any(|f| f.price_estimated) {
        out.push_str("\n~ estimated price");
    }
    out
}

/// Summary lines for the best value, fastest and cheapest nonstop flights.
pub fn highlight_lines(response: &SearchResponse) -> Vec<String> {
    let Some(highlights) = &response.meta.highlights else {
        return Vec::new();
    };
    let mut lines = Vec::new();

    if let Some(f) = response.find(&highlights.best_value) {
        lines.push(format!(
            "Best value: {} {} ({})",
            f.airline,
            display_price(f),
            format_stops(f.stops).to_lowercase()
        ));
    }
    if let Some(f) = highlights.fastest.as_deref().and_then(|id| response.find(id)) {
        lines.push(format!("Fastest: {} {}", f.airline, f.duration));
    }
    if let Some(f) = highlights
        .cheapest_direct
        .as_deref()
        .and_then(|id| response.find(id))
    {
        lines.push(format!("Direct: {} {}", f.airline, display_price(f)));
    }
    lines
}

/// One line per flight, for scripts and agents.
pub fn render_compact(response: &SearchResponse) -> String {
    response
        .flights
        .iter()
        .map(|f| {
            format!(
                "{} | {}>{} | {} | {}>{} | {} | {} | {}",
                display_price(f),
                f.from,
                f.to,
                f.date,
                f.departure_time,
                f.arrival_time,
                f.duration,
                format_stops(f.stops).to_lowercase(),
                f.airline,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
