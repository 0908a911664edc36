//! Synthetic results served when no real provider has anything usable.
//!
//! Output is random per call; pass a seeded RNG for repeatable results.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{google_flights_url, round_cents, FlightResult};
use crate::query::SearchParams;

pub const MOCK_SOURCE: &str = "Mock Data (Demo Mode)";
pub const RESULTS_PER_LEG: usize = 10;

const AIRLINES: [&str; 10] = ["BA", "LH", "AF", "KL", "EK", "QR", "TK", "SQ", "AA", "DL"];
const RETURN_DISCOUNT: f64 = 0.9;

fn random_airline<R: Rng + ?Sized>(rng: &mut R) -> String {
    AIRLINES.choose(rng).copied().unwrap_or("BA").to_string()
}

fn random_duration<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}h {}m", rng.gen_range(5..15), rng.gen_range(0..60))
}

fn clock<R: Rng + ?Sized>(rng: &mut R, hour: usize) -> String {
    format!("{:02}:{:02}", hour % 24, rng.gen_range(0..60))
}

/// Generates [`RESULTS_PER_LEG`] outbound results, plus as many return results
/// when `params` has a return date, sorted by ascending price. Stop counts stay
/// within `params.max_stops`.
pub fn generate<R: Rng + ?Sized>(params: &SearchParams, rng: &mut R) -> Vec<FlightResult> {
    let passengers = f64::from(params.passengers.max(1));
    let max_stops = params.max_stops.unwrap_or(2).min(2);
    let mut flights = Vec::with_capacity(RESULTS_PER_LEG * 2);

    for i in 0..RESULTS_PER_LEG {
        let base = rng.gen_range(200.0..1000.0) * passengers;
        let stops = rng.gen_range(0..=max_stops);

        flights.push(FlightResult {
            id: format!("MOCK-OUT-{}", i + 1),
            airline: random_airline(rng),
            from: params.origin.clone(),
            to: params.destination.clone(),
            date: params.depart_date.clone(),
            price: round_cents(base),
            currency: params.currency.clone(),
            duration: random_duration(rng),
            stops,
            departure_time: clock(rng, 6 + i),
            arrival_time: clock(rng, 12 + i),
            booking_url: google_flights_url(
                &params.origin,
                &params.destination,
                &params.depart_date,
            ),
            price_estimated: true,
        });

        if let Some(ref return_date) = params.return_date {
            flights.push(FlightResult {
                id: format!("MOCK-RET-{}", i + 1),
                airline: random_airline(rng),
                from: params.destination.clone(),
                to: params.origin.clone(),
                date: return_date.clone(),
                price: round_cents(base * RETURN_DISCOUNT),
                currency: params.currency.clone(),
                duration: random_duration(rng),
                stops,
                departure_time: clock(rng, 14 + i),
                arrival_time: clock(rng, 20 + i),
                booking_url: google_flights_url(&params.destination, &params.origin, return_date),
                price_estimated: true,
            });
        }
    }

    flights.sort_by(|a, b| a.price.total_cmp(&b.price));
    flights
}
