// UI layer: the interactive flows behind `login`, `order`, `show` and
// `status`. Each flow is a short sequence of prompts; invalid input loops
// back to the same prompt. Fatal conditions are returned as errors and the
// binary turns them into exit code 1.

use crate::api::{ConnectionStatus, OrderService};
use crate::config::{Session, SessionStore};
use crate::history;
use crate::model::{GroupOrder, Item, NewItem, NewOrder, OrderId};
use crate::prompt::Prompter;
use crate::table::Table;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Options of the `order` subcommand.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderOptions {
    /// Only render the active orders.
    pub list: bool,
    /// Skip browsing and create a new group order.
    pub create: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Items,
    Groups,
}

/// History entries that passed the recency filter.
#[derive(Debug, Clone, PartialEq)]
pub enum History {
    Groups(Vec<GroupOrder>),
    Items(Vec<Item>),
}

/// What the user typed at the browse prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseChoice {
    Join(usize),
    Create,
    Quit,
    OutOfRange,
    Invalid,
}

/// Interprets browse input against a listing of `count` orders.
pub fn parse_browse_choice(input: &str, count: usize) -> BrowseChoice {
    let input = input.trim();
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return match input.parse::<usize>() {
            Ok(idx) if idx < count => BrowseChoice::Join(idx),
            _ => BrowseChoice::OutOfRange,
        };
    }
    match input {
        "c" => BrowseChoice::Create,
        "q" => BrowseChoice::Quit,
        _ => BrowseChoice::Invalid,
    }
}

/// The interactive controller. Owns the session and persists it through the
/// injected store whenever it changes.
pub struct App<S, St, P> {
    service: S,
    store: St,
    session: Session,
    prompter: P,
}

impl<S, St, P> App<S, St, P>
where
    S: OrderService,
    St: SessionStore,
    P: Prompter,
{
    pub fn new(service: S, store: St, session: Session, prompter: P) -> Self {
        App {
            service,
            store,
            session,
            prompter,
        }
    }

    /// Ask for credentials until login succeeds or the user gives up.
    pub fn login(&mut self) -> Result<()> {
        if self.session.is_authenticated() {
            println!("You are already logged in; a new login replaces the stored token.");
        }
        loop {
            let username = self.prompter.input("Enter Username")?;
            let password = self.prompter.password("Enter Password")?;

            let service = &mut self.service;
            match with_spinner("Logging in...", || service.authenticate(&username, &password)) {
                Ok(token) => {
                    self.session.token = Some(token);
                    self.store
                        .save(&self.session)
                        .context("Could not store the login token")?;
                    tracing::info!(%username, "logged in");
                    println!("{}", "Login Successful".green().bold());
                    return Ok(());
                }
                Err(e) => {
                    print_error(&e.to_string());
                    if !self.prompter.confirm("Try again?")? {
                        println!("Exit cli");
                        bail!("login aborted");
                    }
                }
            }
        }
    }

    /// Entry point of the `order` subcommand.
    pub fn order(&mut self, opts: OrderOptions) -> Result<()> {
        if opts.create {
            return self.create_group_order();
        }
        println!("Oh I see you are hungry. The purpose of APOS is to order Pizza together.\n");
        let orders = self.show_active_group_orders()?;
        if opts.list {
            return Ok(());
        }
        self.browse(&orders)
    }

    fn show_active_group_orders(&self) -> Result<Vec<GroupOrder>> {
        let service = &self.service;
        let orders = with_spinner("Loading active orders...", || service.list_active_orders())
            .context("Could not load active group orders")?;
        print!("{}", orders_table(&orders).with_index());
        Ok(orders)
    }

    fn browse(&mut self, orders: &[GroupOrder]) -> Result<()> {
        if orders.is_empty() {
            println!(
                "\nThere are currently no active groups you can join. \
                 Feel free to create a new group and let others join your group.\n"
            );
            if self.prompter.confirm("Create group?")? {
                return self.create_group_order();
            }
            println!("Exit APOS");
            return Ok(());
        }

        println!(
            "\nLook if there is a group you want to join with your order.\n\
             Enter the number of the group you want to join.\n\
             Not satisfied with the listed groups? Type c to create a new one or enter q to quit!"
        );
        let prompt = format!("~ (0-{} | c | q)", orders.len() - 1);
        loop {
            let input = self.prompter.input(&prompt)?;
            match parse_browse_choice(&input, orders.len()) {
                BrowseChoice::Join(idx) => {
                    let order = &orders[idx];
                    println!("Joining {}", order.title.as_str().bold());
                    return self.create_item(order.id);
                }
                BrowseChoice::Create => {
                    println!("Creating a new group!");
                    return self.create_group_order();
                }
                BrowseChoice::Quit => {
                    println!("Exit APOS");
                    return Ok(());
                }
                BrowseChoice::OutOfRange => {
                    tracing::debug!(%input, "group index out of range");
                    println!("{}", "Invalid group id!".yellow());
                }
                BrowseChoice::Invalid => print_error("Invalid input. Try again!"),
            }
        }
    }

    /// Collect the fields of a new group order and submit it. A rejected
    /// submission is fatal.
    pub fn create_group_order(&mut self) -> Result<()> {
        println!(
            "\nYou are creating a group order. Other people can add their items to your group order.\n"
        );
        let title = self.prompter.input("Whats the title of your order?")?;
        let description = self.prompter.input("Enter a description")?;
        let minutes = self.prompt_parsed::<u32>(
            "In how many minutes do you order at the delivery service?",
            "Please enter a whole number of minutes.",
        )?;
        let location = self.prompter.input("Where are you?")?;
        let deliverer = self.prompter.input("Whats the delivery service?")?;

        if !self.prompter.confirm("Create group?")? {
            println!("Abort");
            return Ok(());
        }

        let order = NewOrder {
            title,
            description,
            deadline: history::deadline_in(Utc::now(), minutes),
            location,
            deliverer,
        };
        let service = &self.service;
        let created = with_spinner("Submitting order...", || service.create_order(&order));
        match created {
            Ok(id) => {
                println!("Order submitted {}", "successfully!".blue());
                if let Some(id) = id {
                    if self.prompter.confirm("Add an item to your new group now?")? {
                        return self.create_item(id);
                    }
                }
                Ok(())
            }
            Err(e) => {
                tracing::debug!(status = ?e.status(), "order rejected");
                Err(e).context("Order not successful")
            }
        }
    }

    /// Collect an item for group `order_id` and submit it, offering a retry
    /// when the service rejects it.
    pub fn create_item(&mut self, order_id: OrderId) -> Result<()> {
        loop {
            let name = self.prompter.input("What do you want to order?")?;
            let tip_percent = self.prompt_amount("Tip in percent")?;
            let price = self.prompt_amount("Price")?;

            if !self.prompter.confirm("Add item?")? {
                println!("Abort");
                return Ok(());
            }

            let item = NewItem {
                name,
                tip_percent,
                price,
            };
            let service = &self.service;
            match with_spinner("Submitting item...", || service.create_item(order_id, &item)) {
                Ok(()) => {
                    println!("Item added {}", "successfully!".blue());
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(status = ?e.status(), order_id, "item rejected");
                    print_error(&format!("Item not successful: {}", e));
                    if !self.prompter.confirm("Try again?")? {
                        return Err(e).context("Item not successful");
                    }
                }
            }
        }
    }

    /// Entry point of the `show` subcommand.
    pub fn show(&mut self, kind: Option<HistoryKind>, window_days: u32) -> Result<()> {
        let kind = match kind {
            Some(kind) => kind,
            None => match self.prompter.select("Show your", &["items", "groups"])? {
                0 => HistoryKind::Items,
                _ => HistoryKind::Groups,
            },
        };
        let window = chrono::Duration::days(i64::from(window_days));
        let table = match self.recent_history(kind, Utc::now(), window)? {
            History::Groups(groups) => orders_table(&groups),
            History::Items(items) => items_table(&items),
        };
        if table.is_empty() {
            println!("Nothing ordered in the last {} days.", window_days);
        } else {
            print!("{}", table);
        }
        Ok(())
    }

    /// Fetch the user's groups or items and keep those whose deadline is
    /// within `window` of `now`.
    fn recent_history(
        &self,
        kind: HistoryKind,
        now: DateTime<Utc>,
        window: chrono::Duration,
    ) -> Result<History> {
        let service = &self.service;
        match kind {
            HistoryKind::Groups => {
                let groups = with_spinner("Loading your groups...", || service.list_user_groups())
                    .context("Could not load your group orders")?;
                Ok(History::Groups(history::recent_orders(groups, now, window)))
            }
            HistoryKind::Items => {
                let items = with_spinner("Loading your items...", || service.list_user_items())
                    .context("Could not load your items")?;
                let groups = if items.iter().any(|i| i.order.is_none()) {
                    with_spinner("Loading your groups...", || service.list_user_groups())
                        .context("Could not load your group orders")?
                } else {
                    Vec::new()
                };
                Ok(History::Items(history::recent_items(items, &groups, now, window)))
            }
        }
    }

    /// Entry point of the `status` subcommand.
    pub fn status(&mut self) -> Result<()> {
        let service = &self.service;
        let status = with_spinner("Connecting...", || service.check_connection())?;
        match status {
            ConnectionStatus::Connected(code) => {
                println!("{}", format!("Connected to API (http {code})").blue());
                Ok(())
            }
            ConnectionStatus::AuthRejected(code) => {
                bail!("Authentication failed (http {code}), please login again")
            }
            ConnectionStatus::ServiceError(code) => bail!("API error (http {code})"),
        }
    }

    fn prompt_parsed<T: std::str::FromStr>(&mut self, prompt: &str, hint: &str) -> Result<T> {
        loop {
            let raw = self.prompter.input(prompt)?;
            match raw.trim().parse::<T>() {
                Ok(value) => return Ok(value),
                Err(_) => println!("{}", hint.yellow()),
            }
        }
    }

    fn prompt_amount(&mut self, prompt: &str) -> Result<f64> {
        loop {
            let value: f64 = self.prompt_parsed(prompt, "Please enter a number, e.g. 8.50.")?;
            if value.is_finite() && value >= 0.0 {
                return Ok(value);
            }
            println!("{}", "The amount can't be negative.".yellow());
        }
    }
}

/// Runs `f` while an indicatif spinner shows `msg`.
fn with_spinner<T>(msg: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    let out = f();
    spinner.finish_and_clear();
    out
}

/// Bold red message on stderr.
pub fn print_error(msg: &str) {
    eprintln!("{}", msg.red().bold());
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn orders_table(orders: &[GroupOrder]) -> Table {
    let mut table = Table::new([
        "Creator",
        "Title",
        "Description",
        "Location",
        "Deliverer",
        "Deadline",
        "Arrival",
    ]);
    for o in orders {
        table.push_row([
            o.owner.username().to_string(),
            o.title.clone(),
            o.description.clone(),
            o.location.clone(),
            o.deliverer.clone(),
            local_time(o.deadline),
            o.arrival.map(local_time).unwrap_or_default(),
        ]);
    }
    table
}

fn items_table(items: &[Item]) -> Table {
    let mut table = Table::new(["Group", "Item", "Tip %", "Price", "Deadline"]);
    for item in items {
        let (group, deadline) = match &item.order {
            Some(o) => (o.title.clone(), local_time(o.deadline)),
            None => (String::new(), String::new()),
        };
        table.push_row([
            group,
            item.name.clone(),
            format!("{}", item.tip_percent),
            format!("{:.2}", item.price),
            deadline,
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiResult};
    use crate::config::ConfigError;
    use crate::model::Owner;
    use crate::prompt::ScriptedPrompter;
    use chrono::TimeZone;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeService {
        valid_password: String,
        token: Option<String>,
        active: Vec<GroupOrder>,
        groups: Vec<GroupOrder>,
        items: Vec<Item>,
        created_order_id: Option<OrderId>,
        fail_create: Option<u16>,
        connection: Option<ConnectionStatus>,
        item_failures: RefCell<u32>,
        orders: RefCell<Vec<NewOrder>>,
        submitted_items: RefCell<Vec<(OrderId, NewItem)>>,
    }

    impl FakeService {
        fn check(&self) -> ApiResult<()> {
            self.token.as_ref().map(|_| ()).ok_or(ApiError::Unauthenticated)
        }
    }

    impl OrderService for FakeService {
        fn authenticate(&mut self, _username: &str, password: &str) -> ApiResult<String> {
            if password == self.valid_password {
                self.token = Some("tok".into());
                Ok("tok".into())
            } else {
                Err(ApiError::AuthFailure { status: 401 })
            }
        }

        fn list_active_orders(&self) -> ApiResult<Vec<GroupOrder>> {
            self.check()?;
            Ok(self.active.clone())
        }

        fn list_user_groups(&self) -> ApiResult<Vec<GroupOrder>> {
            self.check()?;
            Ok(self.groups.clone())
        }

        fn list_user_items(&self) -> ApiResult<Vec<Item>> {
            self.check()?;
            Ok(self.items.clone())
        }

        fn create_order(&self, order: &NewOrder) -> ApiResult<Option<OrderId>> {
            self.check()?;
            if let Some(status) = self.fail_create {
                return Err(ApiError::Request {
                    status,
                    body: String::new(),
                });
            }
            self.orders.borrow_mut().push(order.clone());
            Ok(self.created_order_id)
        }

        fn create_item(&self, order_id: OrderId, item: &NewItem) -> ApiResult<()> {
            self.check()?;
            let mut failures = self.item_failures.borrow_mut();
            if *failures > 0 {
                *failures -= 1;
                return Err(ApiError::Request {
                    status: 503,
                    body: String::new(),
                });
            }
            self.submitted_items
                .borrow_mut()
                .push((order_id, item.clone()));
            Ok(())
        }

        fn check_connection(&self) -> ApiResult<ConnectionStatus> {
            self.check()?;
            Ok(self.connection.unwrap_or(ConnectionStatus::Connected(200)))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Vec<Session>>,
    }

    impl SessionStore for MemoryStore {
        fn load(&self) -> Result<Session, ConfigError> {
            Ok(self.saved.borrow().last().cloned().unwrap_or_default())
        }

        fn save(&self, session: &Session) -> Result<(), ConfigError> {
            self.saved.borrow_mut().push(session.clone());
            Ok(())
        }
    }

    fn logged_in(service: FakeService) -> FakeService {
        FakeService {
            token: Some("tok".into()),
            ..service
        }
    }

    fn app(
        service: FakeService,
        answers: &[&str],
    ) -> App<FakeService, MemoryStore, ScriptedPrompter> {
        App::new(
            service,
            MemoryStore::default(),
            Session::default(),
            ScriptedPrompter::new(answers.iter().copied()),
        )
    }

    fn group(id: OrderId, title: &str, deadline: DateTime<Utc>) -> GroupOrder {
        GroupOrder {
            id,
            title: title.into(),
            description: String::new(),
            deadline,
            location: "Lab".into(),
            deliverer: "Luigi's".into(),
            owner: Owner::Name("alice".into()),
            arrival: None,
        }
    }

    #[test]
    fn browse_input_parsing() {
        assert_eq!(parse_browse_choice("0", 3), BrowseChoice::Join(0));
        assert_eq!(parse_browse_choice(" 2 ", 3), BrowseChoice::Join(2));
        assert_eq!(parse_browse_choice("3", 3), BrowseChoice::OutOfRange);
        assert_eq!(parse_browse_choice("99999999999999999999999", 3), BrowseChoice::OutOfRange);
        assert_eq!(parse_browse_choice("c", 3), BrowseChoice::Create);
        assert_eq!(parse_browse_choice("q", 3), BrowseChoice::Quit);
        assert_eq!(parse_browse_choice("-1", 3), BrowseChoice::Invalid);
        assert_eq!(parse_browse_choice("pizza", 3), BrowseChoice::Invalid);
        assert_eq!(parse_browse_choice("", 3), BrowseChoice::Invalid);
    }

    #[test]
    fn successful_login_persists_token() {
        let service = FakeService {
            valid_password: "secret".into(),
            ..Default::default()
        };
        let mut app = app(service, &["alice", "secret"]);

        app.login().unwrap();

        assert_eq!(app.session.token.as_deref(), Some("tok"));
        let saved = app.store.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].token.as_deref(), Some("tok"));
    }

    #[test]
    fn failed_login_can_be_retried() {
        let service = FakeService {
            valid_password: "secret".into(),
            ..Default::default()
        };
        let mut app = app(service, &["alice", "wrong", "y", "alice", "secret"]);

        app.login().unwrap();
        assert!(app.session.is_authenticated());
        assert_eq!(app.store.saved.borrow().len(), 1);
    }

    #[test]
    fn declined_login_retry_is_fatal_and_persists_nothing() {
        let service = FakeService {
            valid_password: "secret".into(),
            ..Default::default()
        };
        let mut app = app(service, &["alice", "wrong", "n"]);

        assert!(app.login().is_err());
        assert!(!app.session.is_authenticated());
        assert!(app.store.saved.borrow().is_empty());
    }

    #[test]
    fn order_without_login_fails_with_auth_error() {
        let mut app = app(FakeService::default(), &[]);

        let err = app.order(OrderOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn invalid_browse_input_reprompts_then_joins() {
        let now = Utc::now();
        let service = logged_in(FakeService {
            active: vec![group(10, "first", now), group(20, "second", now)],
            ..Default::default()
        });
        // "2" is out of range, "x" is junk, then join group 1 and add an item.
        let mut app = app(service, &["2", "x", "1", "Salami", "10", "9.5", "y"]);

        app.order(OrderOptions::default()).unwrap();

        let items = app.service.submitted_items.borrow();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].0, 20);
        assert_eq!(items[0].1.name, "Salami");
        assert_eq!(items[0].1.price, 9.5);
        assert!(app.service.orders.borrow().is_empty());
        assert_eq!(app.prompter.remaining(), 0);
    }

    #[test]
    fn quit_from_browse_is_clean() {
        let service = logged_in(FakeService {
            active: vec![group(1, "only", Utc::now())],
            ..Default::default()
        });
        let mut app = app(service, &["q"]);
        app.order(OrderOptions::default()).unwrap();
        assert!(app.service.submitted_items.borrow().is_empty());
    }

    #[test]
    fn list_only_does_not_prompt() {
        let service = logged_in(FakeService {
            active: vec![group(1, "only", Utc::now())],
            ..Default::default()
        });
        let mut app = app(service, &[]);
        app.order(OrderOptions {
            list: true,
            create: false,
        })
        .unwrap();
        assert!(app.prompter.asked.is_empty());
    }

    #[test]
    fn no_active_orders_offers_creation() {
        let service = logged_in(FakeService::default());
        let mut app = app(
            service,
            &["y", "Pizza", "", "30", "Lab 2", "Luigi's", "y"],
        );

        app.order(OrderOptions::default()).unwrap();
        assert_eq!(app.service.orders.borrow().len(), 1);
    }

    #[test]
    fn created_order_deadline_is_minutes_from_now() {
        let service = logged_in(FakeService::default());
        let mut app = app(
            service,
            &["Friday", "big ones", "soon", "45", "Lab 2", "Luigi's", "y"],
        );

        let before = Utc::now();
        app.create_group_order().unwrap();
        let after = Utc::now();

        let orders = app.service.orders.borrow();
        let order = &orders[0];
        assert_eq!(order.title, "Friday");
        assert_eq!(order.description, "big ones");
        assert_eq!(order.location, "Lab 2");
        assert_eq!(order.deliverer, "Luigi's");
        assert!(order.deadline >= history::deadline_in(before, 45));
        assert!(order.deadline <= history::deadline_in(after, 45));
    }

    #[test]
    fn declined_order_confirmation_submits_nothing() {
        let service = logged_in(FakeService::default());
        let mut app = app(service, &["t", "d", "5", "l", "x", "n"]);
        app.create_group_order().unwrap();
        assert!(app.service.orders.borrow().is_empty());
    }

    #[test]
    fn rejected_order_is_fatal_with_status() {
        let service = logged_in(FakeService {
            fail_create: Some(500),
            ..Default::default()
        });
        let mut app = app(service, &["t", "d", "5", "l", "x", "y"]);

        let err = app.create_group_order().unwrap_err();
        assert_eq!(
            err.downcast_ref::<ApiError>().and_then(ApiError::status),
            Some(500)
        );
    }

    #[test]
    fn new_order_id_leads_into_item_creation() {
        let service = logged_in(FakeService {
            created_order_id: Some(42),
            ..Default::default()
        });
        let mut app = app(
            service,
            &["t", "d", "5", "l", "x", "y", "y", "Funghi", "0", "7", "y"],
        );

        app.create_group_order().unwrap();
        let items = app.service.submitted_items.borrow();
        assert_eq!(items[0].0, 42);
        assert_eq!(items[0].1.tip_percent, 0.0);
    }

    #[test]
    fn item_failure_offers_retry() {
        let service = logged_in(FakeService {
            item_failures: RefCell::new(1),
            ..Default::default()
        });
        let mut app = app(
            service,
            &["Salami", "-5", "10", "9", "y", "y", "Salami", "10", "9", "y"],
        );

        app.create_item(3).unwrap();
        assert_eq!(app.service.submitted_items.borrow().len(), 1);
    }

    #[test]
    fn declined_item_retry_is_fatal() {
        let service = logged_in(FakeService {
            item_failures: RefCell::new(1),
            ..Default::default()
        });
        let mut app = app(service, &["Salami", "10", "9", "y", "n"]);

        assert!(app.create_item(3).is_err());
        assert!(app.service.submitted_items.borrow().is_empty());
    }

    fn salami(order_id: Option<OrderId>, order: Option<GroupOrder>) -> Item {
        Item {
            id: None,
            name: "Salami".into(),
            tip_percent: 10.0,
            price: 9.0,
            order_id,
            order,
        }
    }

    #[test]
    fn show_asks_for_kind_when_missing() {
        let service = logged_in(FakeService::default());
        let mut app = app(service, &["1"]);
        app.show(None, 2).unwrap();
        assert_eq!(app.prompter.asked, vec!["Show your".to_string()]);
    }

    #[test]
    fn recent_items_resolve_through_groups_and_drop_stale() {
        let now = Utc::now();
        let service = logged_in(FakeService {
            groups: vec![
                group(1, "recent", now - chrono::Duration::hours(3)),
                group(2, "stale", now - chrono::Duration::days(3)),
            ],
            items: vec![
                salami(Some(1), None),
                salami(Some(2), None),
                salami(None, Some(group(7, "nested", now - chrono::Duration::days(1)))),
                salami(Some(99), None),
            ],
            ..Default::default()
        });
        let app = app(service, &[]);

        let history = app
            .recent_history(HistoryKind::Items, now, chrono::Duration::days(2))
            .unwrap();
        let History::Items(items) = history else {
            panic!("expected items");
        };
        let groups: Vec<_> = items
            .iter()
            .map(|i| i.order.as_ref().map(|o| o.title.as_str()))
            .collect();
        assert_eq!(groups, vec![Some("recent"), Some("nested")]);
    }

    #[test]
    fn recent_groups_exclude_old_deadlines() {
        let now = Utc::now();
        let service = logged_in(FakeService {
            groups: vec![
                group(1, "old", Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
                group(2, "yesterday", now - chrono::Duration::days(1)),
            ],
            ..Default::default()
        });
        let mut app = app(service, &[]);

        let history = app
            .recent_history(HistoryKind::Groups, now, chrono::Duration::days(2))
            .unwrap();
        let History::Groups(groups) = history else {
            panic!("expected groups");
        };
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].title, "yesterday");

        app.show(Some(HistoryKind::Groups), 2).unwrap();
        assert!(app.prompter.asked.is_empty());
    }

    #[test]
    fn status_reports_connection() {
        let mut app = app(
            logged_in(FakeService {
                connection: Some(ConnectionStatus::Connected(204)),
                ..Default::default()
            }),
            &[],
        );
        app.status().unwrap();

        let mut app = self::app(
            logged_in(FakeService {
                connection: Some(ConnectionStatus::AuthRejected(401)),
                ..Default::default()
            }),
            &[],
        );
        let err = app.status().unwrap_err();
        assert!(err.to_string().contains("http 401"));

        let mut app = self::app(FakeService::default(), &[]);
        assert!(app.status().is_err());
    }

    #[test]
    fn login_when_already_logged_in_replaces_token() {
        let service = FakeService {
            valid_password: "secret".into(),
            ..Default::default()
        };
        let session = Session {
            token: Some("old".into()),
            ..Session::default()
        };
        let mut app = App::new(
            service,
            MemoryStore::default(),
            session,
            ScriptedPrompter::new(["alice", "secret"]),
        );
        app.login().unwrap();
        assert_eq!(app.session.token.as_deref(), Some("tok"));
    }

    #[test]
    fn tables_render_owner_and_amounts() {
        let deadline = Utc::now();
        let rendered = orders_table(&[group(1, "Friday", deadline)]).to_string();
        assert!(rendered.contains("Creator"));
        assert!(rendered.contains("alice"));
        assert!(rendered.contains(&local_time(deadline)));

        let rendered = items_table(&[Item {
            id: None,
            name: "Salami".into(),
            tip_percent: 12.5,
            price: 9.5,
            order_id: None,
            order: Some(group(1, "Friday", deadline)),
        }])
        .to_string();
        assert!(rendered.contains("12.5"));
        assert!(rendered.contains("9.50"));
        assert!(rendered.contains("Friday"));
    }
}
