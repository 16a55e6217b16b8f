pub mod alert;
pub mod alert_history;
pub mod department;
pub mod kpi;
