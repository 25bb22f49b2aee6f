pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod goal;
pub mod history;
pub mod ingest;
pub mod performance;
pub mod ports;
pub mod schedule;
pub mod scoring;
pub mod summary;
pub mod timeslot;
pub mod trend;

pub use config::{canonical_name, CaseLocale, CompositeScoreConfig, MetricsConfig};
pub use domain::{
    CompletedTask, Exam, ExamSubjectResult, NewExam, NewExamSubject, NewStudySession, NewSubject,
    PlannedTask, ScheduleTask, StudySession, StudySessionUpdate, Subject, TargetConfig,
    TaskStatus, UserSnapshot,
};
pub use ingest::IngestError;
pub use ports::{
    ExamDataService, PortError, PortResult, RecommendationKind, RecommendationService,
};
pub use schedule::{ScheduleError, SchedulePreferences};
pub use summary::SummaryError;
pub use trend::{Trend, TrendDirection};
