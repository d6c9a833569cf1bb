mod confirm_session;
mod helpers;
mod mocks;
mod webhook;
