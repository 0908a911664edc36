use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use farechain::chain::ProviderChain;
use farechain::config::ProviderConfig;
use farechain::error::FlightError;
use farechain::mock::MOCK_SOURCE;
use farechain::model::FlightResult;
use farechain::provider::FlightProvider;
use farechain::query::{Direction, LegQuery, SearchRequest, TripType};

#[derive(Clone, Copy)]
enum Reply {
    Results(usize),
    Empty,
    Fail,
    Hang,
}

struct FakeProvider {
    name: &'static str,
    enabled: bool,
    outbound: Reply,
    inbound: Reply,
    min_stops: u32,
    calls: Arc<AtomicUsize>,
}

impl FakeProvider {
    fn new(name: &'static str, outbound: Reply, inbound: Reply) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Self {
            name,
            enabled: true,
            outbound,
            inbound,
            min_stops: 0,
            calls: calls.clone(),
        };
        (provider, calls)
    }

    fn disabled(name: &'static str) -> (Self, Arc<AtomicUsize>) {
        let (mut provider, calls) = Self::new(name, Reply::Results(3), Reply::Results(3));
        provider.enabled = false;
        (provider, calls)
    }
}

#[async_trait]
impl FlightProvider for FakeProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn fetch(&self, leg: &LegQuery) -> Result<Vec<FlightResult>, FlightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = match leg.direction {
            Direction::Outbound => self.outbound,
            Direction::Return => self.inbound,
        };
        match reply {
            Reply::Results(n) => Ok((0..n)
                .map(|i| FlightResult {
                    id: leg.result_id(self.name, i),
                    airline: "ZZ".into(),
                    from: leg.origin.clone(),
                    to: leg.destination.clone(),
                    date: leg.date.clone(),
                    price: 100.0 + i as f64,
                    currency: leg.currency.clone(),
                    duration: format!("{}h 0m", 10 - i),
                    stops: self.min_stops + i as u32 % 3,
                    departure_time: "08:00".into(),
                    arrival_time: "09:00".into(),
                    booking_url: "https://example.com/book".into(),
                    price_estimated: false,
                })
                .collect()),
            Reply::Empty => Ok(Vec::new()),
            Reply::Fail => Err(FlightError::HttpStatus(503)),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
        }
    }
}

fn one_way() -> SearchRequest {
    SearchRequest {
        from: Some("LHR".into()),
        to: Some("JFK".into()),
        depart_date: Some("2025-06-01".into()),
        passengers: Some(2),
        currency: Some("USD".into()),
        ..Default::default()
    }
}

fn round_trip() -> SearchRequest {
    SearchRequest {
        return_date: Some("2025-06-10".into()),
        ..one_way()
    }
}

#[tokio::test]
async fn no_providers_falls_back_to_mock() {
    let chain = ProviderChain::new(Vec::new());
    let response = chain.resolve(one_way()).await.unwrap();

    assert!(response.success);
    assert_eq!(response.meta.api_used, MOCK_SOURCE);
    assert_eq!(response.flights.len(), 10);
    assert_eq!(response.meta.count, 10);
    assert_eq!(response.meta.currency, "USD");
    assert_eq!(response.meta.trip_type, TripType::OneWay);
    assert!(response
        .flights
        .iter()
        .all(|f| f.from == "LHR" && f.to == "JFK" && f.price > 0.0));
    assert!(response.flights.windows(2).all(|w| w[0].price <= w[1].price));
}

#[tokio::test]
async fn disabled_providers_are_never_called() {
    let (a, a_calls) = FakeProvider::disabled("A");
    let (b, b_calls) = FakeProvider::disabled("B");
    let chain = ProviderChain::new(vec![Box::new(a), Box::new(b)]);

    let response = chain.resolve(round_trip()).await.unwrap();
    assert_eq!(response.meta.api_used, MOCK_SOURCE);
    assert_eq!(response.flights.len(), 20);
    assert_eq!(response.meta.trip_type, TripType::Return);
    assert_eq!(a_calls.load(Ordering::SeqCst), 0);
    assert_eq!(b_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_provider_with_results_wins() {
    let (a, a_calls) = FakeProvider::new("A", Reply::Results(4), Reply::Empty);
    let (b, b_calls) = FakeProvider::new("B", Reply::Results(2), Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a), Box::new(b)]);

    let response = chain.resolve(one_way()).await.unwrap();
    assert_eq!(response.meta.api_used, "A");
    assert_eq!(response.flights.len(), 4);
    assert!(!response.meta.return_leg_missing);
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_and_empty_providers_fall_through() {
    let (a, _) = FakeProvider::new("A", Reply::Fail, Reply::Fail);
    let (b, _) = FakeProvider::new("B", Reply::Empty, Reply::Empty);
    let (c, _) = FakeProvider::new("C", Reply::Results(5), Reply::Empty);
    let (d, d_calls) = FakeProvider::new("D", Reply::Results(5), Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a), Box::new(b), Box::new(c), Box::new(d)]);

    let response = chain.resolve(one_way()).await.unwrap();
    assert_eq!(response.meta.api_used, "C");
    assert!(response.flights.iter().all(|f| f.id.starts_with("C-")));
    assert_eq!(d_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn all_providers_failing_yields_mock() {
    let (a, _) = FakeProvider::new("A", Reply::Fail, Reply::Fail);
    let (b, _) = FakeProvider::new("B", Reply::Empty, Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a), Box::new(b)]);

    let response = chain.resolve(one_way()).await.unwrap();
    assert_eq!(response.meta.api_used, MOCK_SOURCE);
    assert_eq!(response.flights.len(), 10);
}

#[tokio::test]
async fn round_trip_needs_both_legs() {
    let (a, a_calls) = FakeProvider::new("A", Reply::Results(3), Reply::Results(2));
    let chain = ProviderChain::new(vec![Box::new(a)]);

    let response = chain.resolve(round_trip()).await.unwrap();
    assert_eq!(response.meta.api_used, "A");
    assert_eq!(response.flights.len(), 5);
    assert_eq!(a_calls.load(Ordering::SeqCst), 2);

    let returns: Vec<_> = response
        .flights
        .iter()
        .filter(|f| f.id.starts_with("A-RET-"))
        .collect();
    assert_eq!(returns.len(), 2);
    assert!(returns.iter().all(|f| f.from == "JFK" && f.to == "LHR"));
}

#[tokio::test]
async fn complete_round_trip_beats_earlier_partial() {
    let (a, _) = FakeProvider::new("A", Reply::Results(3), Reply::Empty);
    let (b, _) = FakeProvider::new("B", Reply::Results(1), Reply::Results(1));
    let chain = ProviderChain::new(vec![Box::new(a), Box::new(b)]);

    let response = chain.resolve(round_trip()).await.unwrap();
    assert_eq!(response.meta.api_used, "B");
    assert_eq!(response.flights.len(), 2);
    assert!(!response.meta.return_leg_missing);
}

#[tokio::test]
async fn outbound_only_is_kept_without_fabricating_return() {
    let (a, _) = FakeProvider::new("A", Reply::Results(3), Reply::Fail);
    let (b, _) = FakeProvider::new("B", Reply::Empty, Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a), Box::new(b)]);

    let response = chain.resolve(round_trip()).await.unwrap();
    assert_eq!(response.meta.api_used, "A");
    assert!(response.meta.return_leg_missing);
    assert_eq!(response.flights.len(), 3);
    assert!(response
        .flights
        .iter()
        .all(|f| f.from == "LHR" && f.to == "JFK" && f.id.starts_with("A-OUT-")));
}

#[tokio::test]
async fn first_partial_is_preferred_over_later_partial() {
    let (a, _) = FakeProvider::new("A", Reply::Results(2), Reply::Empty);
    let (b, _) = FakeProvider::new("B", Reply::Results(6), Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a), Box::new(b)]);

    let response = chain.resolve(round_trip()).await.unwrap();
    assert_eq!(response.meta.api_used, "A");
    assert_eq!(response.flights.len(), 2);
}

#[tokio::test]
async fn return_leg_alone_is_not_usable() {
    let (a, _) = FakeProvider::new("A", Reply::Empty, Reply::Results(4));
    let chain = ProviderChain::new(vec![Box::new(a)]).with_mock_seed(1);

    let response = chain.resolve(round_trip()).await.unwrap();
    assert_eq!(response.meta.api_used, MOCK_SOURCE);
    assert_eq!(response.flights.len(), 20);
}

#[tokio::test]
async fn hanging_provider_times_out() {
    let (a, _) = FakeProvider::new("A", Reply::Hang, Reply::Hang);
    let (b, _) = FakeProvider::new("B", Reply::Results(1), Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a), Box::new(b)])
        .with_call_timeout(Duration::from_millis(50));

    let response = chain.resolve(one_way()).await.unwrap();
    assert_eq!(response.meta.api_used, "B");
}

#[tokio::test]
async fn missing_fields_contact_no_provider() {
    let (a, a_calls) = FakeProvider::new("A", Reply::Results(3), Reply::Results(3));
    let chain = ProviderChain::new(vec![Box::new(a)]);

    for request in [
        SearchRequest { from: None, ..one_way() },
        SearchRequest { to: None, ..one_way() },
        SearchRequest { depart_date: Some(String::new()), ..one_way() },
    ] {
        let err = chain.resolve(request).await.unwrap_err();
        assert!(err.is_validation());
    }
    assert_eq!(a_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn seeded_mock_is_repeatable() {
    let chain = ProviderChain::new(Vec::new()).with_mock_seed(99);
    let a = chain.resolve(one_way()).await.unwrap();
    let b = chain.resolve(one_way()).await.unwrap();
    assert_eq!(a.flights, b.flights);
}

#[tokio::test]
async fn enabled_providers_lists_only_enabled() {
    let (a, _) = FakeProvider::disabled("A");
    let (b, _) = FakeProvider::new("B", Reply::Empty, Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a), Box::new(b)]);
    assert_eq!(chain.enabled_providers(), ["B"]);
}

#[tokio::test]
async fn stop_limit_filters_provider_results() {
    let (a, _) = FakeProvider::new("A", Reply::Results(5), Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a)]);

    let request = SearchRequest {
        max_stops: Some(0),
        ..one_way()
    };
    let response = chain.resolve(request).await.unwrap();
    assert_eq!(response.meta.api_used, "A");
    let ids: Vec<&str> = response.flights.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, ["A-OUT-1", "A-OUT-4"]);
    assert_eq!(response.meta.count, 2);
}

#[tokio::test]
async fn provider_with_nothing_under_stop_limit_falls_through() {
    let (mut a, _) = FakeProvider::new("A", Reply::Results(5), Reply::Empty);
    a.min_stops = 1;
    let (b, _) = FakeProvider::new("B", Reply::Results(2), Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a), Box::new(b)]);

    let request = SearchRequest {
        max_stops: Some(0),
        ..one_way()
    };
    let response = chain.resolve(request).await.unwrap();
    assert_eq!(response.meta.api_used, "B");
    assert!(response.flights.iter().all(|f| f.stops == 0));
}

#[tokio::test]
async fn mock_respects_stop_limit() {
    let chain = ProviderChain::new(Vec::new()).with_mock_seed(4);
    let request = SearchRequest {
        max_stops: Some(0),
        ..round_trip()
    };
    let response = chain.resolve(request).await.unwrap();
    assert_eq!(response.meta.api_used, MOCK_SOURCE);
    assert_eq!(response.flights.len(), 20);
    assert!(response.flights.iter().all(|f| f.stops == 0));
}

#[tokio::test]
async fn source_order_is_kept_without_sort() {
    let (a, _) = FakeProvider::new("A", Reply::Results(4), Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a)]);
    let response = chain.resolve(one_way()).await.unwrap();
    let ids: Vec<&str> = response.flights.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, ["A-OUT-1", "A-OUT-2", "A-OUT-3", "A-OUT-4"]);
}

#[tokio::test]
async fn duration_sort_puts_shortest_first() {
    let (a, _) = FakeProvider::new("A", Reply::Results(4), Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a)]);
    let request = SearchRequest {
        sort: Some("duration".into()),
        ..one_way()
    };
    let response = chain.resolve(request).await.unwrap();
    let ids: Vec<&str> = response.flights.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, ["A-OUT-4", "A-OUT-3", "A-OUT-2", "A-OUT-1"]);
}

#[tokio::test]
async fn highlights_describe_the_winning_results() {
    let (a, _) = FakeProvider::new("A", Reply::Results(4), Reply::Empty);
    let chain = ProviderChain::new(vec![Box::new(a)]);
    let response = chain.resolve(one_way()).await.unwrap();

    let highlights = response.meta.highlights.unwrap();
    assert_eq!(highlights.best_value, "A-OUT-1");
    assert_eq!(highlights.fastest.as_deref(), Some("A-OUT-4"));
    // The cheapest result is already nonstop.
    assert_eq!(highlights.cheapest_direct, None);
}

#[tokio::test]
async fn one_shot_search_without_credentials_uses_mock() {
    let config = ProviderConfig {
        mock_seed: Some(8),
        ..Default::default()
    };
    let response = farechain::search(round_trip(), &config).await.unwrap();
    assert_eq!(response.meta.api_used, MOCK_SOURCE);
    assert_eq!(response.meta.count, 20);

    let err = farechain::search(SearchRequest::default(), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, FlightError::MissingFields(_)));
}
