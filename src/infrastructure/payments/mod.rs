pub mod charge_client;
