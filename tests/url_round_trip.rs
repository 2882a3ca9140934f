//! Property: decoding the encoding of any view state yields the same state
//! in canonical form, and the encoding of a decoded query is stable. Starting
//! a session from any address bar keeps the configured page size.

use futures::future::BoxFuture;
use futures::FutureExt;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

use specs_browser::error::FetchError;
use specs_browser::filter::{FilterCriteria, OrderBy, OrderedSet, KNOWN_STATUSES, KNOWN_TYPES};
use specs_browser::pagination::MAX_RESTORE_PAGES;
use specs_browser::specs::{CacheKey, ListSpecsQuery, LookupKind, Page, Spec, SpecsApi};
use specs_browser::{MemoryNavigation, SpecsSession, UrlCodec, ViewState};

const PAGE_SIZE: usize = 50;

/// Answers every list request with a full page and records it.
#[derive(Clone, Default)]
struct FullPages {
  requests: Arc<Mutex<Vec<ListSpecsQuery>>>,
}

impl FullPages {
  fn requests(&self) -> Vec<ListSpecsQuery> {
    self.requests.lock().unwrap().clone()
  }
}

impl SpecsApi for FullPages {
  fn list_specs(&self, query: ListSpecsQuery) -> BoxFuture<'static, Result<Page, FetchError>> {
    let specs = (0..query.limit)
      .map(|i| Spec {
        id: format!("S-{}", query.offset + i),
        title: String::new(),
        authors: Vec::new(),
        team: String::new(),
        spec_type: String::new(),
        status: String::new(),
        google_doc_url: String::new(),
        google_doc_updated_at: Default::default(),
        google_doc_id: None,
        google_doc_name: None,
        google_doc_created_at: None,
      })
      .collect();
    self.requests.lock().unwrap().push(query);
    futures::future::ready(Ok(Page { specs, total: 1_000_000 })).boxed()
  }

  fn lookup(&self, _kind: LookupKind) -> BoxFuture<'static, Result<Vec<String>, FetchError>> {
    futures::future::ready(Ok(Vec::new())).boxed()
  }
}

fn arb_number_text() -> impl Strategy<Value = String> {
  prop_oneof![
    any::<usize>().prop_map(|n| n.to_string()),
    Just(usize::MAX.to_string()),
    "[0-9]{1,30}",
    "-?[0-9]{1,4}",
    "\\PC{0,8}",
  ]
}

fn arb_text() -> impl Strategy<Value = String> {
  // Includes characters that need escaping in a query string
  "[ a-zA-Z0-9&=+?%#/ÅéЖ]{0,16}"
}

fn arb_scalar() -> impl Strategy<Value = Option<String>> {
  prop::option::of(arb_text())
}

fn arb_set(known: &'static [&'static str]) -> impl Strategy<Value = OrderedSet> {
  let member = prop_oneof![
    3 => prop::sample::select(known).prop_map(String::from),
    1 => arb_text(),
  ];
  prop::collection::vec(member, 0..5).prop_map(|values| values.into_iter().collect())
}

fn arb_order_by() -> impl Strategy<Value = OrderBy> {
  prop::sample::select(OrderBy::all_variants())
}

fn arb_filter() -> impl Strategy<Value = FilterCriteria> {
  (
    arb_scalar(),
    arb_set(KNOWN_STATUSES),
    arb_set(KNOWN_TYPES),
    arb_scalar(),
    arb_scalar(),
    arb_order_by(),
  )
    .prop_map(|(team, statuses, types, author, reviewer, order_by)| FilterCriteria {
      team,
      statuses,
      types,
      author,
      reviewer,
      order_by,
    })
}

fn arb_view_state() -> impl Strategy<Value = ViewState> {
  (arb_filter(), arb_scalar(), 0usize..20, 0usize..49).prop_map(
    |(filter, search_query, page, jitter)| ViewState {
      filter,
      search_query,
      offset: page * PAGE_SIZE + jitter,
      limit: PAGE_SIZE,
    },
  )
}

proptest! {
  #[test]
  fn prop_decode_inverts_encode(state in arb_view_state()) {
    let codec = UrlCodec::new(PAGE_SIZE);
    let decoded = codec.decode(&codec.encode(&state));
    prop_assert_eq!(decoded, state.normalized());
  }

  #[test]
  fn prop_encoding_is_stable(state in arb_view_state()) {
    let codec = UrlCodec::new(PAGE_SIZE);
    let once = codec.encode(&state);
    let twice = codec.encode(&codec.decode(&once));
    prop_assert_eq!(once, twice);
  }

  #[test]
  fn prop_decode_never_panics(raw in "\\PC{0,64}") {
    let state = UrlCodec::new(PAGE_SIZE).decode(&raw);
    prop_assert_eq!(state.offset % state.limit, 0);
  }

  #[test]
  fn prop_cache_key_ignores_set_order(
    mut statuses in prop::collection::vec(prop::sample::select(KNOWN_STATUSES), 0..6),
    search in arb_scalar(),
  ) {
    let forward = FilterCriteria {
      statuses: statuses.iter().copied().collect(),
      ..Default::default()
    };
    statuses.reverse();
    let backward = FilterCriteria {
      statuses: statuses.iter().copied().collect(),
      ..Default::default()
    };
    prop_assert_eq!(
      CacheKey::new(&forward, search.as_deref()),
      CacheKey::new(&backward, search.as_deref())
    );
  }
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn prop_session_start_keeps_configured_page_size(
    offset in arb_number_text(),
    limit in arb_number_text(),
  ) {
    let query = format!("offset={}&limit={}", offset, limit);
    let api = FullPages::default();
    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .unwrap();

    let state = runtime.block_on(async {
      let mut session =
        SpecsSession::start(Arc::new(api.clone()), MemoryNavigation::new(query.as_str()), PAGE_SIZE);
      session.settle().await;
      session.state().clone()
    });

    let requests = api.requests();
    prop_assert_eq!(state.limit, PAGE_SIZE);
    prop_assert_eq!(state.offset % PAGE_SIZE, 0);
    prop_assert!(!requests.is_empty());
    prop_assert!(requests.len() <= MAX_RESTORE_PAGES);
    prop_assert!(requests.iter().all(|q| q.limit == PAGE_SIZE));
    let offsets: Vec<usize> = requests.iter().map(|q| q.offset).collect();
    let expected: Vec<usize> = (0..requests.len()).map(|i| i * PAGE_SIZE).collect();
    prop_assert_eq!(offsets, expected);
  }
}
