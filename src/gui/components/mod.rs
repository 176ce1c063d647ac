pub mod dialogs;
