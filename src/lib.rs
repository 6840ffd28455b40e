//! # doc-rag
//!
//! Upload documents, then ask questions answered only from their content.
//!
//! ## Architecture
//!
//! ```text
//!   upload ──► parser ──► chunker ──► embedder ──┐
//!                                                ▼
//!                              ┌──────────────────────────────┐
//!                              │ CorpusManager (one RwLock)   │
//!                              │  VectorIndex ◄─► Docstore    │──► snapshot
//!                              │  position i  ◄─► record i    │   (index + docstore blobs)
//!                              └──────────────┬───────────────┘
//!                                             │ k nearest (squared L2)
//!   question ──► embedder ────────────────────┘
//!                                             ▼
//!                                   prompt with [Source: file, Page n] blocks
//!                                             │
//!                                             ▼
//!                                         generator ──► answer
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration, including chunk window/stride
//! - [`models`] - Chunk records, retrieval results, request/response types
//! - [`parser`] - PDF and plain-text page extraction
//! - [`chunking`] - Overlapping word-window chunker
//! - [`llm`] - Embedding and generation clients (Ollama, OpenAI-compatible, Gemini)
//! - [`search`] - Exact nearest-neighbour vector index
//! - [`corpus`] - Index + docstore pair, ingestion, retrieval, snapshot persistence
//! - [`storage`] - Named-blob storage backing the snapshot
//! - [`answer`] - Grounding prompt assembly and answer generation
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state

pub mod answer;
pub mod api;
pub mod chunking;
pub mod config;
pub mod corpus;
pub mod error;
pub mod llm;
pub mod models;
pub mod parser;
pub mod search;
pub mod state;
pub mod storage;
