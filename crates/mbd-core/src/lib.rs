//! Core engine of the MBD playlist batch downloader.
//!
//! Pipeline: playlist text → [`playlist`] → [`job::plan_jobs`] (output paths
//! via [`output_path`]) → [`reconcile`] → [`scheduler`], which runs each job
//! through [`transcode`] attempts observed by [`progress`] and cancellable
//! through [`control`].

pub mod config;
pub mod logging;

pub mod control;
pub mod job;
pub mod output_path;
pub mod playlist;
pub mod progress;
pub mod reconcile;
pub mod retry;
pub mod scheduler;
pub mod selection;
pub mod transcode;
