pub mod canned_server;
