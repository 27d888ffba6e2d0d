mod app;
mod browser;
mod download;
mod modal;
mod navbar;
mod notification;
mod route;
mod tools;
mod upload;

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<app::App>::new().render();
}
