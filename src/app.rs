use crate::cache::{DataSource, LocalStore, Record};
use crate::commands;
use crate::config::{AuthMode, Config};
use crate::content::{
  defaults, Collection, Entry, FaqItem, Inquiry, PortfolioItem, PricingPlan, PublishStatus,
  ReviewStatus, Service, ServiceStatus, Testimonial,
};
use crate::remote::{Disconnected, RemoteStore, SupabaseStore};
use crate::session::{DemoSessionGuard, RemoteSessionGuard, SessionGuard};
use crate::sync::{SyncRepository, UpsertOutcome};
use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use url::Url;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Action {
  /// Show a collection (settings, services, portfolio, testimonials, faqs, inquiries, pricing)
  List {
    collection: String,
    /// Only what a visitor of the site would see
    #[arg(long)]
    public: bool,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
  },
  /// Create or update a record from a JSON file ("-" reads stdin)
  Upsert { collection: String, input: PathBuf },
  /// Delete a record by id
  Delete { collection: String, id: String },
  /// Send a contact-form inquiry
  Inquire {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long)]
    message: String,
    /// Pricing plan the inquiry is about
    #[arg(long)]
    plan: Option<String>,
  },
  /// Sign in as site admin
  Login { email: String },
  /// Sign out
  Logout,
  /// Show backend, cache and session state
  Status,
  /// Admin dashboard counts
  Stats,
}

/// One-line rendering of a record for table output
trait Summary {
  fn summary(&self) -> String;
}

impl Summary for Service {
  fn summary(&self) -> String {
    let status = match self.status {
      ServiceStatus::Active => "active",
      ServiceStatus::Hidden => "hidden",
    };
    format!("{} [{}]", self.title, status)
  }
}

impl Summary for PortfolioItem {
  fn summary(&self) -> String {
    let draft = if self.status == PublishStatus::Draft { " [draft]" } else { "" };
    format!("{} - {}{}", self.title, self.category, draft)
  }
}

impl Summary for Testimonial {
  fn summary(&self) -> String {
    let pending = if self.status == ReviewStatus::Pending { " [pending]" } else { "" };
    format!("{} {}{}", self.name, "*".repeat(self.rating.into()), pending)
  }
}

impl Summary for FaqItem {
  fn summary(&self) -> String {
    self.question.clone()
  }
}

impl Summary for Inquiry {
  fn summary(&self) -> String {
    let mut message: String = self.message.chars().take(60).collect();
    if message.len() < self.message.len() {
      message.push_str("...");
    }
    format!(
      "{} {} <{}>: {}",
      self.created_at.format("%Y-%m-%d %H:%M"),
      self.name,
      self.email,
      message
    )
  }
}

impl Summary for PricingPlan {
  fn summary(&self) -> String {
    let popular = if self.is_popular { " (popular)" } else { "" };
    format!("{} {}{}", self.name, self.price, popular)
  }
}

/// Direct-contact link offered when an inquiry cannot be submitted.
fn whatsapp_link(number: &str, inquiry: &Inquiry) -> Result<Url> {
  let mut text = format!("Hi, I'm {}. {}", inquiry.name, inquiry.message);
  if let Some(plan) = &inquiry.plan {
    text.push_str(&format!(" (Plan: {})", plan));
  }

  let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
  Url::parse_with_params(&format!("https://wa.me/{}", digits), &[("text", text)])
    .map_err(|e| eyre!("Failed to build WhatsApp link: {}", e))
}

fn read_input(input: &Path) -> Result<String> {
  if input == Path::new("-") {
    std::io::read_to_string(std::io::stdin()).map_err(|e| eyre!("Failed to read stdin: {}", e))
  } else {
    std::fs::read_to_string(input)
      .map_err(|e| eyre!("Failed to read {}: {}", input.display(), e))
  }
}

fn read_password() -> Result<String> {
  if let Some(password) = Config::get_admin_password() {
    return Ok(password);
  }

  eprint!("Password: ");
  std::io::stderr().flush()?;
  let mut line = String::new();
  std::io::stdin()
    .read_line(&mut line)
    .map_err(|e| eyre!("Failed to read password: {}", e))?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Main application state
pub struct App<S: LocalStore> {
  config: Config,
  repo: SyncRepository<S>,
  guard: Box<dyn SessionGuard>,
}

impl<S: LocalStore + 'static> App<S> {
  pub fn new(config: Config, store: S) -> Result<Self> {
    let store = Arc::new(store);

    let remote: Arc<dyn RemoteStore> = match &config.remote {
      Some(remote) => Arc::new(SupabaseStore::new(remote, Config::get_anon_key()?)?),
      None => Arc::new(Disconnected),
    };

    let guard: Box<dyn SessionGuard> = match config.auth.mode {
      AuthMode::Demo => {
        let email = config
          .auth
          .demo_email
          .as_deref()
          .ok_or_else(|| eyre!("auth.mode is demo but auth.demo_email is not set"))?;
        let secret = Config::get_demo_password()?;
        Box::new(DemoSessionGuard::new(Arc::clone(&store), email, &secret))
      }
      AuthMode::Remote => Box::new(RemoteSessionGuard::new(
        Arc::clone(&store),
        Arc::clone(&remote),
      )),
    };

    Ok(Self::assemble(config, store, remote, guard))
  }

  fn assemble(
    config: Config,
    store: Arc<S>,
    remote: Arc<dyn RemoteStore>,
    guard: Box<dyn SessionGuard>,
  ) -> Self {
    Self {
      config,
      repo: SyncRepository::new(store, remote),
      guard,
    }
  }

  pub async fn run(&self, action: Action) -> Result<()> {
    match action {
      Action::List {
        collection,
        public,
        json,
      } => self.list(commands::resolve(&collection)?, public, json).await,
      Action::Upsert { collection, input } => {
        self.upsert(commands::resolve(&collection)?, &input).await
      }
      Action::Delete { collection, id } => self.delete(commands::resolve(&collection)?, &id).await,
      Action::Inquire {
        name,
        email,
        phone,
        message,
        plan,
      } => {
        self
          .inquire(Inquiry::new(&name, &email, &phone, &message, plan.as_deref()))
          .await
      }
      Action::Login { email } => self.login(&email).await,
      Action::Logout => {
        self.guard.logout().await;
        println!("Logged out.");
        Ok(())
      }
      Action::Status => {
        self.status();
        Ok(())
      }
      Action::Stats => self.stats().await,
    }
  }

  fn require_admin(&self) -> Result<()> {
    if self.guard.is_authorized() {
      Ok(())
    } else {
      Err(eyre!("Admin login required. Run `studiosync login <email>` first."))
    }
  }

  // ==========================================================================
  // Reads
  // ==========================================================================

  async fn list(&self, collection: Collection, public: bool, json: bool) -> Result<()> {
    if collection.is_private() {
      self.require_admin()?;
    }

    match collection {
      Collection::Settings => self.show_settings(json).await,
      Collection::Services => self.list_records(defaults::services(), public, json).await,
      Collection::Portfolio => self.list_records(defaults::portfolio(), public, json).await,
      Collection::Testimonials => self.list_records(defaults::testimonials(), public, json).await,
      Collection::Faqs => self.list_records(defaults::faqs(), public, json).await,
      Collection::Inquiries => self.list_records::<Inquiry>(Vec::new(), public, json).await,
      Collection::Pricing => self.list_records(defaults::pricing(), public, json).await,
    }
  }

  async fn list_records<T: Record + Summary>(
    &self,
    defaults: Vec<T>,
    public: bool,
    json: bool,
  ) -> Result<()> {
    let loaded = self.repo.get_all(&defaults).await;
    let mut items = loaded.data;
    if public {
      items.retain(|r| r.is_public());
    }

    if json {
      return print_json(&items);
    }

    println!(
      "{} ({}, from {})",
      T::collection(),
      items.len(),
      loaded.source.label()
    );
    for item in &items {
      println!("  {:<38} {}", item.id().unwrap_or("-"), item.summary());
    }
    Ok(())
  }

  async fn show_settings(&self, json: bool) -> Result<()> {
    let loaded = self.repo.get_settings(Some(defaults::settings())).await;
    let settings = loaded.data.unwrap_or_default();

    if json {
      return print_json(&settings);
    }

    println!("settings (from {})", loaded.source.label());
    let fields = [
      ("site_name", Some(&settings.site_name)),
      ("tagline", Some(&settings.tagline)),
      ("whatsapp_number", settings.whatsapp_number.as_ref()),
      ("contact_phone", settings.contact_phone.as_ref()),
      ("contact_email", settings.contact_email.as_ref()),
      ("address", settings.address.as_ref()),
      ("footer_text", settings.footer_text.as_ref()),
    ];
    for (name, value) in fields {
      if let Some(value) = value.filter(|v| !v.is_empty()) {
        println!("  {:<16} {}", name, value);
      }
    }
    Ok(())
  }

  async fn stats(&self) -> Result<()> {
    self.require_admin()?;

    let service_defaults = defaults::services();
    let portfolio_defaults = defaults::portfolio();
    let testimonial_defaults = defaults::testimonials();
    let faq_defaults = defaults::faqs();

    let (services, portfolio, testimonials, faqs, inquiries) = futures::join!(
      self.repo.get_all(&service_defaults),
      self.repo.get_all(&portfolio_defaults),
      self.repo.get_all(&testimonial_defaults),
      self.repo.get_all(&faq_defaults),
      self.repo.get_all::<Inquiry>(&[]),
    );

    let offline = [
      services.source,
      portfolio.source,
      testimonials.source,
      faqs.source,
      inquiries.source,
    ]
    .iter()
    .any(|s| *s != DataSource::Remote);

    let count_public = |n: usize, total: usize| format!("{} ({} public)", total, n);
    println!(
      "services      {}",
      count_public(services.data.iter().filter(|s| s.is_public()).count(), services.data.len())
    );
    println!(
      "portfolio     {}",
      count_public(portfolio.data.iter().filter(|p| p.is_public()).count(), portfolio.data.len())
    );
    println!(
      "testimonials  {} ({} pending approval)",
      testimonials.data.len(),
      testimonials.data.iter().filter(|t| !t.is_public()).count()
    );
    println!("faqs          {}", faqs.data.len());
    println!("inquiries     {}", inquiries.data.len());
    if offline {
      println!("(some counts come from the local copy; the remote was unavailable)");
    }
    Ok(())
  }

  fn status(&self) {
    match self.config.remote.as_ref().filter(|_| self.repo.is_connected()) {
      Some(remote) => println!("remote   {}", remote.url),
      None => println!("remote   not configured (local-only)"),
    }
    println!(
      "cache    {:?} [{}]",
      self.config.cache.backend, self.config.cache.namespace
    );
    println!("auth     {:?}", self.config.auth.mode);
    match self.guard.current_user() {
      Some(email) => println!("session  {}", email),
      None => println!("session  not logged in"),
    }
  }

  // ==========================================================================
  // Writes
  // ==========================================================================

  async fn upsert(&self, collection: Collection, input: &Path) -> Result<()> {
    self.require_admin()?;

    let entry = Entry::parse(collection, &read_input(input)?)?;
    let missing = entry.missing_fields();
    if !missing.is_empty() {
      return Err(eyre!("Missing required fields: {}", missing.join(", ")));
    }

    match entry {
      Entry::Settings(settings) => {
        let outcome = self.repo.update_settings(settings).await;
        report(Collection::Settings, outcome.record.id.as_deref(), &outcome);
      }
      Entry::Service(service) => self.save(service).await,
      Entry::Portfolio(item) => self.save(item).await,
      Entry::Testimonial(testimonial) => self.save(testimonial).await,
      Entry::Faq(faq) => self.save(faq).await,
      Entry::Pricing(plan) => self.save(plan).await,
    }
    Ok(())
  }

  async fn save<T: Record>(&self, record: T) {
    let outcome = self.repo.upsert(record).await;
    report(T::collection(), outcome.record.id(), &outcome);
  }

  async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
    self.require_admin()?;

    let synced = match collection {
      Collection::Settings => return Err(eyre!("Site settings cannot be deleted")),
      Collection::Services => self.repo.delete::<Service>(id).await,
      Collection::Portfolio => self.repo.delete::<PortfolioItem>(id).await,
      Collection::Testimonials => self.repo.delete::<Testimonial>(id).await,
      Collection::Faqs => self.repo.delete::<FaqItem>(id).await,
      Collection::Inquiries => self.repo.delete::<Inquiry>(id).await,
      Collection::Pricing => self.repo.delete::<PricingPlan>(id).await,
    };
    println!("{}", delete_notice(collection, id, synced));
    Ok(())
  }

  async fn inquire(&self, inquiry: Inquiry) -> Result<()> {
    let blank: Vec<&str> = [
      ("name", &inquiry.name),
      ("email", &inquiry.email),
      ("message", &inquiry.message),
    ]
    .into_iter()
    .filter(|(_, v)| v.trim().is_empty())
    .map(|(field, _)| field)
    .collect();
    if !blank.is_empty() {
      return Err(eyre!("Missing required fields: {}", blank.join(", ")));
    }

    if self.repo.submit_inquiry(&inquiry).await {
      println!("Thanks {}! We'll get back to you shortly.", inquiry.name);
    } else {
      let link = whatsapp_link(&self.config.contact.whatsapp_number, &inquiry)?;
      println!("We couldn't send your message right now.");
      println!("Reach us directly on WhatsApp instead: {}", link);
    }
    Ok(())
  }

  async fn login(&self, email: &str) -> Result<()> {
    let secret = read_password()?;
    match self.guard.login(email, &secret).await {
      Ok(()) => {
        info!(email, "logged in");
        println!("Logged in as {}.", email);
        Ok(())
      }
      Err(e) => Err(eyre!("{}", e.user_message())),
    }
  }
}

fn report<T>(collection: Collection, id: Option<&str>, outcome: &UpsertOutcome<T>) {
  let id = id.unwrap_or("-");
  let verb = if outcome.accepted { "Saved" } else { "Not saved" };
  if outcome.persisted_remotely {
    println!("{} {} {}.", verb, collection, id);
    return;
  }

  match &outcome.error {
    Some(e) => println!("{} {} {} (saved locally only: {}).", verb, collection, id, e),
    None => println!("{} {} {} (saved locally only).", verb, collection, id),
  }
}

fn delete_notice(collection: Collection, id: &str, synced: bool) -> String {
  if synced {
    format!("Deleted {} {}.", collection, id)
  } else {
    format!("Deleted {} {} (saved locally only).", collection, id)
  }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  let out =
    serde_json::to_string_pretty(value).map_err(|e| eyre!("Failed to encode output: {}", e))?;
  println!("{}", out);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStore;

  fn demo_app() -> (App<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new("test"));
    let guard = Box::new(DemoSessionGuard::new(Arc::clone(&store), "admin@studio.dev", "pw"));
    let app = App::assemble(
      Config::default(),
      Arc::clone(&store),
      Arc::new(Disconnected),
      guard,
    );
    (app, store)
  }

  #[test]
  fn test_whatsapp_link_carries_the_message() {
    let inquiry = Inquiry::new("Asha", "a@example.com", "", "Need a shop & blog", Some("Premium"));
    let link = whatsapp_link("+91 95212 07156", &inquiry).unwrap();

    assert_eq!(link.host_str(), Some("wa.me"));
    assert_eq!(link.path(), "/919521207156");
    let (_, text) = link.query_pairs().next().unwrap();
    assert_eq!(text, "Hi, I'm Asha. Need a shop & blog (Plan: Premium)");
  }

  #[test]
  fn test_summaries() {
    let mut plan = defaults::pricing().remove(0);
    plan.is_popular = true;
    assert!(plan.summary().ends_with("(popular)"));

    let inquiry = Inquiry::new("A", "a@example.com", "", &"x".repeat(80), None);
    assert!(inquiry.summary().ends_with("..."));
  }

  #[tokio::test]
  async fn test_admin_actions_need_login() {
    let (app, _) = demo_app();

    let delete = Action::Delete {
      collection: "services".to_string(),
      id: "seo".to_string(),
    };
    assert!(app.run(delete.clone()).await.is_err());

    let inquiries = Action::List {
      collection: "inquiries".to_string(),
      public: false,
      json: false,
    };
    assert!(app.run(inquiries).await.is_err());
    assert!(app.run(Action::Stats).await.is_err());

    app.guard.login("admin@studio.dev", "pw").await.unwrap();
    app.run(delete).await.unwrap();

    let services = app.repo.get_all(&defaults::services()).await;
    assert!(services.data.iter().all(|s| s.id() != Some("seo")));
  }

  #[tokio::test]
  async fn test_upsert_from_file_offline() {
    let (app, _) = demo_app();
    app.guard.login("admin@studio.dev", "pw").await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("faq.json");
    std::fs::write(&path, r#"{"question": "Do you host sites?", "answer": "Yes."}"#).unwrap();

    app
      .run(Action::Upsert {
        collection: "faq".to_string(),
        input: path,
      })
      .await
      .unwrap();

    let faqs = app.repo.get_all(&defaults::faqs()).await;
    let added = faqs
      .data
      .iter()
      .find(|f| f.question == "Do you host sites?")
      .unwrap();
    assert!(crate::cache::is_local_id(added.id().unwrap()));
  }

  #[tokio::test]
  async fn test_upsert_rejects_missing_fields() {
    let (app, _) = demo_app();
    app.guard.login("admin@studio.dev", "pw").await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("service.json");
    std::fs::write(&path, r#"{"title": "  "}"#).unwrap();

    let result = app
      .run(Action::Upsert {
        collection: "services".to_string(),
        input: path,
      })
      .await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_inquiry_without_backend_falls_back() {
    let (app, _) = demo_app();
    let inquire = Action::Inquire {
      name: "Asha".to_string(),
      email: "a@example.com".to_string(),
      phone: String::new(),
      message: "Hello".to_string(),
      plan: None,
    };
    // Not submitted, but the fallback is a normal outcome
    app.run(inquire).await.unwrap();

    let blank = Action::Inquire {
      name: "Asha".to_string(),
      email: " ".to_string(),
      phone: String::new(),
      message: "Hello".to_string(),
      plan: None,
    };
    assert!(app.run(blank).await.is_err());
  }

  #[test]
  fn test_delete_notice_flags_local_only() {
    assert_eq!(
      delete_notice(Collection::Faqs, "7", true),
      "Deleted faqs 7."
    );
    assert_eq!(
      delete_notice(Collection::Faqs, "7", false),
      "Deleted faqs 7 (saved locally only)."
    );
  }

  #[tokio::test]
  async fn test_settings_cannot_be_deleted() {
    let (app, _) = demo_app();
    app.guard.login("admin@studio.dev", "pw").await.unwrap();

    let result = app
      .run(Action::Delete {
        collection: "settings".to_string(),
        id: "1".to_string(),
      })
      .await;
    assert!(result.is_err());
  }
}
