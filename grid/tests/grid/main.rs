mod controller;
mod endpoint;
mod helpers;
