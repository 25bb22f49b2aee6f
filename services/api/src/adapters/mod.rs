pub mod db;
pub mod recommendation_llm;

pub use db::DbAdapter;
pub use recommendation_llm::OpenAiRecommendationAdapter;
