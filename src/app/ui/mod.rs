mod controls;
mod dependencies;
mod details;
mod panels;
