pub mod chart_service;
pub mod embed_service;
pub mod extract_service;
pub mod relay_service;
pub mod render_service;
pub mod stock_service;
