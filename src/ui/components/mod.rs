pub mod explanation;
pub mod genre_menu;
pub mod progress_bar;
pub mod question_view;
pub mod result_dashboard;
pub mod splash;
pub mod toast;
