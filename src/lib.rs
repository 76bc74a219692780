pub mod core;
pub mod analysis;
pub mod index;
pub mod scoring;
pub mod query;
pub mod search;
pub mod eval;

/*
┌──────────────────────────────────────────────────────────────────────────────────────┐
│                              RANKLAB STRUCT ARCHITECTURE                              │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── CORE LAYER ──────────────────────────────────────┐
│                                                                                       │
│  ┌────────────────────────────────────────────────────────────────────────────────┐  │
│  │                                 struct Engine                                  │  │
│  │  config: Config                  // index / analyzer / similarity / search     │  │
│  │  index: Arc<InvertedIndex>       // frozen after build, shared by all queries  │  │
│  │  parser: QueryParser             // free text -> Query                         │  │
│  │  evaluator: QueryEvaluator       // filter -> score -> rank                    │  │
│  └────────────────────────────────────────────────────────────────────────────────┘  │
│                                                                                       │
│  ┌─────────────────────────┐  ┌──────────────────────────┐  ┌──────────────────────┐ │
│  │ struct DocumentCollection│  │ struct Document          │  │ enum FieldValue      │ │
│  │ • documents: Vec<Doc>   │  │ • id: DocId              │  │ • Text(String)       │ │
│  │ • add() -> DocId        │  │ • fields: HashMap        │  │ • Number(i64)        │ │
│  └─────────────────────────┘  │ • judgment: Option<>     │  │ • Date(NaiveDate)    │ │
│                                └──────────────────────────┘  └──────────────────────┘ │
└───────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── INDEX LAYER ─────────────────────────────────────┐
│                                                                                       │
│  ┌─────────────────────────┐  ┌──────────────────────────┐  ┌──────────────────────┐ │
│  │ struct IndexWriter      │  │ struct InvertedIndex     │  │ struct PostingList   │ │
│  │ • index_document()      │  │ • fields: FieldIndex map │  │ • postings: Vec<>    │ │
│  │ • finish() -> Index     │  │ • all_docs: Roaring      │  │   sorted by doc_id   │ │
│  └─────────────────────────┘  │ • range_index: BTreeMap  │  └──────────────────────┘ │
│                                └──────────────────────────┘                           │
└───────────────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────── QUERY / SEARCH LAYER ──────────────────────────────────┐
│                                                                                       │
│  ┌─────────────────────────┐  ┌──────────────────────────┐  ┌──────────────────────┐ │
│  │ struct Query            │  │ struct QueryEvaluator    │  │ trait Similarity     │ │
│  │ • clauses: field ->     │  │ • evaluate()             │  │ • VectorSpace        │ │
│  │   must/should/must_not  │  │ • evaluate_batch() rayon │  │ • Bm25               │ │
│  │ • range: Option<>       │  └──────────────────────────┘  └──────────────────────┘ │
│  └─────────────────────────┘                                                          │
└───────────────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────── RELATIONSHIPS ─────────────────────────────────────┐
│                                                                                       │
│  Engine ──owns──> InvertedIndex ──contains──> PostingList ──contains──> Posting       │
│     │                  │                                                              │
│     │                  └──uses──> Analyzer ──(Tokenizer, TokenFilter*, Stemmer)       │
│     │                                                                                 │
│     ├──owns──> QueryEvaluator ──scores_with──> Similarity ──returns──> RankedResult  │
│     │                                                                                 │
│     └──reports──> EvaluationReport <──uses── MetricsEngine <──reads── Judgment       │
│                                                                                       │
└───────────────────────────────────────────────────────────────────────────────────────┘
*/
