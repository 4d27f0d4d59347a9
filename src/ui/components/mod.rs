pub mod menu;
pub mod nav_strip;
pub mod question_card;
pub mod results_panel;
pub mod timer_gauge;
