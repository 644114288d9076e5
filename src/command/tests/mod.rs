//! Unit tests for the chat command surface.
