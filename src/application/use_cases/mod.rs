pub mod billable_admin;
