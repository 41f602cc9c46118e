use crate::agent::{AgentError, ChatModel, SqlAgent};
use crate::db::connection::Database;
use crate::domain::listing::{Listing, PriceLevel};
use crate::errors::ServerError;
use crate::service::AppService;
use astra::{Body, Request, Response};
use std::collections::VecDeque;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A path under the temp dir that no other test will use.
pub fn unique_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("{prefix}_{nanos}_{n}"))
}

pub fn temp_db(prefix: &str) -> Database {
    Database::new(unique_path(prefix).with_extension("sqlite"))
}

/// Fresh directory holding the given (file name, contents) pairs.
pub fn data_dir(files: &[(&str, &str)]) -> PathBuf {
    let dir = unique_path("etl_data");
    fs::create_dir_all(&dir).unwrap();
    for (name, contents) in files {
        fs::write(dir.join(name), contents).unwrap();
    }
    dir
}

pub const MADRID_CSV: &str = "\
name,address,cuisine,rating,price_level,num_reviews,subrating_rate_food,subrating_rate_service,subrating_rate_atmosphere,url
Casa Pepe,Calle Mayor 1,Spanish,4.5,€€€€,120,4.6,4.4,4.2,https://example.test/casa-pepe
Sobrino de Botín,Calle de Cuchilleros 17,,4.3,€€ - €€€,3500,4.5,4.1,4.8,https://example.test/botin
Bar Nuevo,Plaza 3,Tapas,not rated,€,,,,,
";

/// Barcelona's export lacks the sub-rating and cuisine columns entirely.
pub const BARCELONA_CSV: &str = "\
name,address,rating,price_level,num_reviews,url
El Xampanyet,Carrer de Montcada 22,4.7,€,890,https://example.test/xampanyet
Quimet,Carrer del Poeta Cabanyes 25,4.4,??,410,https://example.test/quimet
";

pub fn sample_dir() -> PathBuf {
    data_dir(&[("madrid.csv", MADRID_CSV), ("barcelona.csv", BARCELONA_CSV)])
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn read_json(mut resp: Response) -> serde_json::Value {
    let mut bytes = Vec::new();
    resp.body_mut().reader().read_to_end(&mut bytes).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[derive(Clone)]
pub enum Behavior {
    Answer(String),
    MissingKey,
    Fail,
}

/// Stand-in agent that records what it was asked.
#[derive(Clone)]
pub struct FakeAgent {
    behavior: Behavior,
    pub questions: Arc<Mutex<Vec<String>>>,
}

impl FakeAgent {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            questions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.questions.lock().unwrap().len()
    }
}

impl SqlAgent for FakeAgent {
    fn ask(&self, question: &str) -> Result<String, AgentError> {
        self.questions.lock().unwrap().push(question.to_string());
        match &self.behavior {
            Behavior::Answer(a) => Ok(a.clone()),
            Behavior::MissingKey => Err(AgentError::MissingCredential),
            Behavior::Fail => Err(AgentError::Query("no such column: stars".to_string())),
        }
    }
}

pub fn service_with(agent: FakeAgent) -> AppService {
    AppService::new(temp_db("svc"), Box::new(agent))
}

/// Chat model that replays canned replies and keeps every prompt it saw.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, AgentError>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub has_key: bool,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, AgentError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Arc::new(Mutex::new(Vec::new())),
            has_key: true,
        }
    }
}

impl ChatModel for ScriptedModel {
    fn has_credential(&self) -> bool {
        self.has_key
    }

    fn generate(&self, _system: &str, user: &str) -> Result<String, AgentError> {
        self.prompts.lock().unwrap().push(user.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::Provider("script exhausted".to_string())))
    }
}

pub fn remove_dir(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

/// Every `restaurants` row in insertion order.
pub fn load_restaurants(db: &Database) -> Result<Vec<Listing>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(
                "SELECT name, address, cuisine, rating, price_level, num_reviews, \
                 subrating_rate_food, subrating_rate_service, subrating_rate_atmosphere, url, city \
                 FROM restaurants ORDER BY rowid",
            )
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let price: String = row.get(4)?;
                let price_level = match price.as_str() {
                    "Low" => PriceLevel::Low,
                    "Medium" => PriceLevel::Medium,
                    "High" => PriceLevel::High,
                    _ => PriceLevel::Unspecified,
                };
                Ok(Listing {
                    name: row.get(0)?,
                    address: row.get(1)?,
                    cuisine: row.get(2)?,
                    rating: row.get(3)?,
                    price_level,
                    num_reviews: row.get(5)?,
                    subrating_rate_food: row.get(6)?,
                    subrating_rate_service: row.get(7)?,
                    subrating_rate_atmosphere: row.get(8)?,
                    url: row.get(9)?,
                    city: row.get(10)?,
                })
            })
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })
}
