mod api;
mod scenario;
