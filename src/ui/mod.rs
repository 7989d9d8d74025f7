// UI module - Slint window and event loop plumbing
//
// This module contains:
// - EventLoopBridge: wakes the Slint event loop when hand-backs are queued
// - GuiController: owns the window and the computation session behind it

pub mod bridge;
pub mod controller;

pub use bridge::EventLoopBridge;
pub use controller::{GuiController, SlintPresenter};
