//! Server skeleton: entry point, app composition and cross-cutting middleware
//!
//! Every generated `src/app.js` exports `buildServer()`, which resolves to a
//! Node `http.Server` that is not yet listening. Feature modules export an
//! `applyX(target)` function that `app.js` awaits in a fixed order.

use super::framework_variant;
use crate::config::{Feature, Framework, ValidConfig};

/// A feature module mounted by `app.js`
struct Mount {
    feature: Feature,
    module: &'static str,
    apply: &'static str,
    /// Koa mounts route modules on the router instead of the app
    routes: bool,
}

/// Mount order: request logging first, then headers, throttling, sessions, routes
const MOUNTS: &[Mount] = &[
    Mount {
        feature: Feature::Logging,
        module: "./middleware/request-logger.middleware",
        apply: "applyRequestLogger",
        routes: false,
    },
    Mount {
        feature: Feature::Helmet,
        module: "./config/security",
        apply: "applySecurityHeaders",
        routes: false,
    },
    Mount {
        feature: Feature::Cors,
        module: "./config/cors",
        apply: "applyCors",
        routes: false,
    },
    Mount {
        feature: Feature::RateLimit,
        module: "./middleware/rate-limit.middleware",
        apply: "applyRateLimit",
        routes: false,
    },
    Mount {
        feature: Feature::Redis,
        module: "./middleware/session.middleware",
        apply: "applySession",
        routes: false,
    },
    Mount {
        feature: Feature::Auth,
        module: "./routes/auth.routes",
        apply: "applyAuthRoutes",
        routes: true,
    },
    Mount {
        feature: Feature::FileUpload,
        module: "./routes/upload.routes",
        apply: "applyUploadRoutes",
        routes: true,
    },
    Mount {
        feature: Feature::ApiDocs,
        module: "./routes/docs.routes",
        apply: "applyDocsRoutes",
        routes: true,
    },
];

/// Framework-specific pieces of `app.js`
struct Shape {
    head: &'static str,
    setup: &'static str,
    app: &'static str,
    router: &'static str,
    health: &'static str,
    tail: &'static str,
}

fn shape(framework: Framework) -> Shape {
    match framework {
        Framework::Express => Shape {
            head: "const http = require('http');\nconst express = require('express');\n",
            setup: "  const app = express();\n",
            app: "app",
            router: "app",
            health: "  app.use(express.json());\n\n  app.get('/health', (req, res) => res.json({ status: 'ok' }));\n",
            tail: r#"
  app.use((req, res) => res.status(404).json({ error: 'Not found' }));
  // eslint-disable-next-line no-unused-vars
  app.use((err, req, res, next) => {
    const status = err.status || 500;
    res.status(status).json({ error: status === 500 ? 'Internal server error' : err.message });
  });

  return http.createServer(app);
"#,
        },
        Framework::Fastify => Shape {
            head: "const Fastify = require('fastify');\n",
            setup: r#"  const app = Fastify({ logger: false });
  app.setErrorHandler((err, request, reply) => {
    const status = err.statusCode || 500;
    reply.code(status).send({ error: status === 500 ? 'Internal server error' : err.message });
  });
"#,
            app: "app",
            router: "app",
            health: "\n  app.get('/health', async () => ({ status: 'ok' }));\n",
            tail: "\n  await app.ready();\n  return app.server;\n",
        },
        Framework::Koa => Shape {
            head: "const http = require('http');\nconst Koa = require('koa');\nconst Router = require('@koa/router');\nconst bodyParser = require('koa-bodyparser');\n",
            setup: r#"  const app = new Koa();
  const router = new Router();
  app.use(async (ctx, next) => {
    try {
      await next();
    } catch (err) {
      ctx.status = err.status || 500;
      ctx.body = { error: ctx.status === 500 ? 'Internal server error' : err.message };
    }
  });
"#,
            app: "app",
            router: "router",
            health: "  app.use(bodyParser());\n\n  router.get('/health', (ctx) => {\n    ctx.body = { status: 'ok' };\n  });\n",
            tail: "\n  app.use(router.routes()).use(router.allowedMethods());\n  return http.createServer(app.callback());\n",
        },
        Framework::Hapi => Shape {
            head: "const Hapi = require('@hapi/hapi');\n",
            setup: "  const server = Hapi.server({ port: Number(process.env.PORT) || 3000, host: '0.0.0.0' });\n",
            app: "server",
            router: "server",
            health: "\n  server.route({ method: 'GET', path: '/health', handler: () => ({ status: 'ok' }) });\n",
            tail: "\n  await server.initialize();\n  return server.listener;\n",
        },
    }
}

pub fn app_composition(variant: &str, config: &ValidConfig) -> Option<String> {
    let framework = framework_variant(variant)?;
    let shape = shape(framework);
    let mounts: Vec<&Mount> = MOUNTS.iter().filter(|m| config.has(m.feature)).collect();

    let mut out = String::from(shape.head);
    for mount in &mounts {
        out.push_str(&format!(
            "const {{ {} }} = require('{}');\n",
            mount.apply, mount.module
        ));
    }

    out.push_str("\nasync function buildServer() {\n");
    out.push_str(shape.setup);
    let middleware: Vec<_> = mounts.iter().filter(|m| !m.routes).collect();
    if !middleware.is_empty() {
        out.push('\n');
    }
    for mount in middleware {
        out.push_str(&format!("  await {}({});\n", mount.apply, shape.app));
    }
    if framework != Framework::Fastify && framework != Framework::Hapi {
        out.push('\n');
    }
    out.push_str(shape.health);
    for mount in mounts.iter().filter(|m| m.routes) {
        out.push_str(&format!("  await {}({});\n", mount.apply, shape.router));
    }
    out.push_str(shape.tail);
    out.push_str("}\n\nmodule.exports = { buildServer };\n");
    Some(out)
}

pub fn entry_point(variant: &str, config: &ValidConfig) -> Option<String> {
    let framework = framework_variant(variant)?;

    let mut out = String::from("require('dotenv').config();\n\n");
    out.push_str("const { buildServer } = require('./app');\n");
    out.push_str("const { connectDatabase, disconnectDatabase } = require('./config/database');\n");
    if config.has(Feature::Redis) {
        out.push_str("const { redis } = require('./config/redis');\n");
    }
    if config.has(Feature::Logging) {
        out.push_str("const logger = require('./utils/logger');\n");
    } else {
        out.push_str("const logger = console;\n");
    }

    out.push_str(&format!(
        r#"
const PORT = Number(process.env.PORT) || 3000;

async function main() {{
  await connectDatabase();
  const server = await buildServer();
  server.listen(PORT, () => logger.info(`{name} ({framework}) listening on port ${{PORT}}`));

  const shutdown = async (signal) => {{
    logger.info(`${{signal}} received, shutting down`);
    server.close();
    await disconnectDatabase();
"#,
        name = config.project_name(),
        framework = framework.display_name(),
    ));
    if config.has(Feature::Redis) {
        out.push_str("    await redis.quit();\n");
    }
    out.push_str(
        r#"    process.exit(0);
  };
  process.on('SIGINT', shutdown);
  process.on('SIGTERM', shutdown);
}

main().catch((err) => {
  logger.error(err);
  process.exit(1);
});
"#,
    );
    Some(out)
}

const KNEX_CLIENT: &str = r#"const knex = require('knex');

const db = knex(CONFIG);

async function connectDatabase() {
  await db.raw('select 1');
}

async function disconnectDatabase() {
  await db.destroy();
}

module.exports = { db, connectDatabase, disconnectDatabase };
"#;

pub fn database_client(variant: &str) -> Option<String> {
    let knex = |config: &str| Some(KNEX_CLIENT.replace("CONFIG", config));
    match variant {
        "postgres" => knex("{\n  client: 'pg',\n  connection: process.env.DATABASE_URL,\n  pool: { min: 0, max: 10 },\n}"),
        "mysql" => knex("{\n  client: 'mysql2',\n  connection: process.env.DATABASE_URL,\n  pool: { min: 0, max: 10 },\n}"),
        "sqlite" => Some(
            r#"const fs = require('fs');
const path = require('path');
const knex = require('knex');

const filename = process.env.DATABASE_FILE || './data/dev.sqlite3';

const db = knex({
  client: 'better-sqlite3',
  connection: { filename },
  useNullAsDefault: true,
});

async function connectDatabase() {
  if (filename !== ':memory:') {
    fs.mkdirSync(path.dirname(filename), { recursive: true });
  }
  await db.raw('select 1');
}

async function disconnectDatabase() {
  await db.destroy();
}

module.exports = { db, connectDatabase, disconnectDatabase };
"#
            .to_string(),
        ),
        "mongodb" => Some(
            r#"const mongoose = require('mongoose');

async function connectDatabase() {
  await mongoose.connect(process.env.MONGODB_URI);
}

async function disconnectDatabase() {
  await mongoose.disconnect();
}

module.exports = { db: mongoose, connectDatabase, disconnectDatabase };
"#
            .to_string(),
        ),
        // Keeps the entry point uniform when nothing is persisted
        "none" => Some(
            r#"async function connectDatabase() {}

async function disconnectDatabase() {}

module.exports = { db: null, connectDatabase, disconnectDatabase };
"#
            .to_string(),
        ),
        _ => None,
    }
}

pub fn redis_client() -> String {
    r#"const Redis = require('ioredis');

const redis = new Redis(process.env.REDIS_URL || 'redis://localhost:6379', {
  lazyConnect: true,
  maxRetriesPerRequest: 1,
});

const SESSION_TTL_SECONDS = 60 * 60 * 24;

async function loadSession(id) {
  const raw = await redis.get(`session:${id}`);
  return raw ? JSON.parse(raw) : null;
}

async function saveSession(id, data) {
  await redis.set(`session:${id}`, JSON.stringify(data), 'EX', SESSION_TTL_SECONDS);
}

async function destroySession(id) {
  await redis.del(`session:${id}`);
}

module.exports = { redis, loadSession, saveSession, destroySession };
"#
    .to_string()
}

const SESSION_HEAD: &str = r#"const crypto = require('crypto');
const { loadSession, saveSession } = require('../config/redis');

async function restore(id) {
  if (!id) return {};
  try {
    return (await loadSession(id)) || {};
  } catch (err) {
    return {};
  }
}

function persist(id, session) {
  if (Object.keys(session).length > 0) {
    saveSession(id, session).catch(() => {});
  }
}
"#;

pub fn session_middleware(variant: &str) -> Option<String> {
    let body = match framework_variant(variant)? {
        Framework::Express => {
            r#"
function applySession(app) {
  app.use(async (req, res, next) => {
    const incoming = req.get('x-session-id');
    const id = incoming || crypto.randomUUID();
    req.session = await restore(incoming);
    res.set('x-session-id', id);
    res.on('finish', () => persist(id, req.session));
    next();
  });
}
"#
        }
        Framework::Fastify => {
            r#"
function applySession(app) {
  app.decorateRequest('session', null);
  app.addHook('onRequest', async (request, reply) => {
    const incoming = request.headers['x-session-id'];
    request.sessionId = incoming || crypto.randomUUID();
    request.session = await restore(incoming);
    reply.header('x-session-id', request.sessionId);
  });
  app.addHook('onResponse', async (request) => {
    persist(request.sessionId, request.session);
  });
}
"#
        }
        Framework::Koa => {
            r#"
function applySession(app) {
  app.use(async (ctx, next) => {
    const incoming = ctx.get('x-session-id');
    const id = incoming || crypto.randomUUID();
    ctx.state.session = await restore(incoming);
    ctx.set('x-session-id', id);
    await next();
    persist(id, ctx.state.session);
  });
}
"#
        }
        Framework::Hapi => {
            r#"
function applySession(server) {
  server.ext('onPreAuth', async (request, h) => {
    const incoming = request.headers['x-session-id'];
    request.app.sessionId = incoming || crypto.randomUUID();
    request.app.session = await restore(incoming);
    return h.continue;
  });
  server.ext('onPreResponse', (request, h) => {
    const response = request.response;
    if (response.isBoom) {
      response.output.headers['x-session-id'] = request.app.sessionId;
    } else {
      response.header('x-session-id', request.app.sessionId);
    }
    persist(request.app.sessionId, request.app.session);
    return h.continue;
  });
}
"#
        }
    };
    Some(format!("{}{}\nmodule.exports = {{ applySession }};\n", SESSION_HEAD, body))
}

pub fn rate_limit_middleware(variant: &str, config: &ValidConfig) -> Option<String> {
    let framework = framework_variant(variant)?;

    let mut out = String::new();
    if config.has(Feature::Redis) {
        out.push_str("const { redis } = require('../config/redis');\n\n");
    }
    out.push_str(
        "const WINDOW_MS = Number(process.env.RATE_LIMIT_WINDOW_MS) || 60000;\nconst MAX = Number(process.env.RATE_LIMIT_MAX) || 100;\n\n",
    );
    if config.has(Feature::Redis) {
        out.push_str(
            r#"async function hit(key) {
  const id = `rate:${key}`;
  const count = await redis.incr(id);
  if (count === 1) {
    await redis.pexpire(id, WINDOW_MS);
  }
  return count;
}
"#,
        );
    } else {
        out.push_str(
            r#"const windows = new Map();

async function hit(key) {
  const now = Date.now();
  const entry = windows.get(key);
  if (!entry || entry.resetAt <= now) {
    windows.set(key, { count: 1, resetAt: now + WINDOW_MS });
    return 1;
  }
  entry.count += 1;
  return entry.count;
}
"#,
        );
    }
    out.push_str(
        r#"
// Fail open when the counter store is unreachable
async function exceeded(key) {
  try {
    return (await hit(key)) > MAX;
  } catch (err) {
    return false;
  }
}
"#,
    );

    out.push_str(match framework {
        Framework::Express => {
            r#"
function applyRateLimit(app) {
  app.use(async (req, res, next) => {
    res.set('x-ratelimit-limit', String(MAX));
    if (await exceeded(req.ip)) {
      return res.status(429).json({ error: 'Too many requests' });
    }
    next();
  });
}
"#
        }
        Framework::Fastify => {
            r#"
function applyRateLimit(app) {
  app.addHook('onRequest', async (request, reply) => {
    reply.header('x-ratelimit-limit', String(MAX));
    if (await exceeded(request.ip)) {
      reply.code(429).send({ error: 'Too many requests' });
      return reply;
    }
  });
}
"#
        }
        Framework::Koa => {
            r#"
function applyRateLimit(app) {
  app.use(async (ctx, next) => {
    ctx.set('x-ratelimit-limit', String(MAX));
    if (await exceeded(ctx.ip)) {
      ctx.status = 429;
      ctx.body = { error: 'Too many requests' };
      return;
    }
    await next();
  });
}
"#
        }
        Framework::Hapi => {
            r#"
function applyRateLimit(server) {
  server.ext('onRequest', async (request, h) => {
    if (await exceeded(request.info.remoteAddress)) {
      return h.response({ error: 'Too many requests' }).code(429).takeover();
    }
    return h.continue;
  });
}
"#
        }
    });
    out.push_str("\nmodule.exports = { applyRateLimit };\n");
    Some(out)
}

pub fn logger() -> String {
    r#"const pino = require('pino');

const logger = pino({
  level: process.env.LOG_LEVEL || 'info',
  enabled: process.env.NODE_ENV !== 'test',
  transport: process.env.NODE_ENV === 'development' ? { target: 'pino-pretty' } : undefined,
});

module.exports = logger;
"#
    .to_string()
}

pub fn request_logger(variant: &str) -> Option<String> {
    let body = match framework_variant(variant)? {
        Framework::Express => {
            r#"function applyRequestLogger(app) {
  app.use((req, res, next) => {
    const start = Date.now();
    res.on('finish', () => {
      logger.info(
        { method: req.method, url: req.originalUrl, status: res.statusCode, ms: Date.now() - start },
        'request',
      );
    });
    next();
  });
}
"#
        }
        Framework::Fastify => {
            r#"function applyRequestLogger(app) {
  app.addHook('onResponse', async (request, reply) => {
    logger.info(
      { method: request.method, url: request.url, status: reply.statusCode, ms: Math.round(reply.elapsedTime) },
      'request',
    );
  });
}
"#
        }
        Framework::Koa => {
            r#"function applyRequestLogger(app) {
  app.use(async (ctx, next) => {
    const start = Date.now();
    try {
      await next();
    } finally {
      logger.info(
        { method: ctx.method, url: ctx.originalUrl, status: ctx.status, ms: Date.now() - start },
        'request',
      );
    }
  });
}
"#
        }
        Framework::Hapi => {
            r#"function applyRequestLogger(server) {
  server.events.on('response', (request) => {
    logger.info(
      {
        method: request.method.toUpperCase(),
        url: request.path,
        status: request.response && request.response.statusCode,
        ms: request.info.completed - request.info.received,
      },
      'request',
    );
  });
}
"#
        }
    };
    Some(format!(
        "const logger = require('../utils/logger');\n\n{}\nmodule.exports = {{ applyRequestLogger }};\n",
        body
    ))
}

pub fn validation_middleware(variant: &str) -> Option<String> {
    let body = match framework_variant(variant)? {
        Framework::Express => {
            r#"/** Reject request bodies that do not match `schema` */
function validate(schema) {
  return (req, res, next) => {
    const result = schema.safeParse(req.body);
    if (!result.success) {
      return res.status(400).json({ error: 'Validation failed', issues: result.error.issues });
    }
    req.body = result.data;
    next();
  };
}
"#
        }
        Framework::Fastify => {
            r#"/** Reject request bodies that do not match `schema` (use as a preHandler) */
function validate(schema) {
  return async (request, reply) => {
    const result = schema.safeParse(request.body);
    if (!result.success) {
      reply.code(400).send({ error: 'Validation failed', issues: result.error.issues });
      return reply;
    }
    request.body = result.data;
  };
}
"#
        }
        Framework::Koa => {
            r#"/** Reject request bodies that do not match `schema` */
function validate(schema) {
  return async (ctx, next) => {
    const result = schema.safeParse(ctx.request.body);
    if (!result.success) {
      ctx.status = 400;
      ctx.body = { error: 'Validation failed', issues: result.error.issues };
      return;
    }
    ctx.request.body = result.data;
    await next();
  };
}
"#
        }
        Framework::Hapi => {
            r#"/** Payload validator for `options.validate.payload`; hapi answers 400 on throw */
function validate(schema) {
  return async (value) => {
    const result = schema.safeParse(value);
    if (!result.success) {
      throw new Error(result.error.issues.map((issue) => issue.message).join(', '));
    }
    return result.data;
  };
}
"#
        }
    };
    Some(format!("{}\nmodule.exports = {{ validate }};\n", body))
}

pub fn cors_config(variant: &str) -> Option<String> {
    let head = "const ORIGIN = process.env.CORS_ORIGIN || '*';\n\n";
    let body = match framework_variant(variant)? {
        Framework::Express => {
            r#"const cors = require('cors');

function applyCors(app) {
  app.use(cors({ origin: ORIGIN, credentials: ORIGIN !== '*' }));
}
"#
        }
        Framework::Fastify => {
            r#"const cors = require('@fastify/cors');

async function applyCors(app) {
  await app.register(cors, { origin: ORIGIN, credentials: ORIGIN !== '*' });
}
"#
        }
        Framework::Koa => {
            r#"const cors = require('@koa/cors');

function applyCors(app) {
  app.use(cors({ origin: ORIGIN, credentials: ORIGIN !== '*' }));
}
"#
        }
        Framework::Hapi => {
            r#"const HEADERS = {
  'access-control-allow-origin': ORIGIN,
  'access-control-allow-methods': 'GET,POST,PUT,PATCH,DELETE,OPTIONS',
  'access-control-allow-headers': 'content-type,authorization,x-session-id',
};

function applyCors(server) {
  server.route({
    method: 'OPTIONS',
    path: '/{any*}',
    handler: (request, h) => h.response().code(204),
  });
  server.ext('onPreResponse', (request, h) => {
    const response = request.response;
    for (const [name, value] of Object.entries(HEADERS)) {
      if (response.isBoom) {
        response.output.headers[name] = value;
      } else {
        response.header(name, value);
      }
    }
    return h.continue;
  });
}
"#
        }
    };
    Some(format!("{}{}\nmodule.exports = {{ applyCors }};\n", head, body))
}

pub fn security_headers(variant: &str) -> Option<String> {
    let body = match framework_variant(variant)? {
        Framework::Express => {
            r#"const helmet = require('helmet');

function applySecurityHeaders(app) {
  app.use(helmet());
}
"#
        }
        Framework::Fastify => {
            r#"const helmet = require('@fastify/helmet');

async function applySecurityHeaders(app) {
  await app.register(helmet);
}
"#
        }
        Framework::Koa => {
            r#"const helmet = require('koa-helmet');

function applySecurityHeaders(app) {
  app.use(helmet());
}
"#
        }
        Framework::Hapi => {
            r#"const HEADERS = {
  'x-content-type-options': 'nosniff',
  'x-frame-options': 'DENY',
  'referrer-policy': 'no-referrer',
  'strict-transport-security': 'max-age=15552000; includeSubDomains',
};

function applySecurityHeaders(server) {
  server.ext('onPreResponse', (request, h) => {
    const response = request.response;
    for (const [name, value] of Object.entries(HEADERS)) {
      if (response.isBoom) {
        response.output.headers[name] = value;
      } else {
        response.header(name, value);
      }
    }
    return h.continue;
  });
}
"#
        }
    };
    Some(format!("{}\nmodule.exports = {{ applySecurityHeaders }};\n", body))
}

const UPLOAD_LIMITS: &str = "const UPLOAD_DIR = process.env.UPLOAD_DIR || 'uploads';\nconst MAX_BYTES = Number(process.env.UPLOAD_MAX_BYTES) || 5 * 1024 * 1024;\n";

pub fn upload_middleware(variant: &str) -> Option<String> {
    let body = match framework_variant(variant)? {
        Framework::Express | Framework::Koa => {
            let require = if variant == "koa" {
                "const multer = require('@koa/multer');\n"
            } else {
                "const multer = require('multer');\n"
            };
            format!(
                r#"{require}const path = require('path');
const crypto = require('crypto');

{limits}
const storage = multer.diskStorage({{
  destination: UPLOAD_DIR,
  filename: (req, file, cb) => cb(null, `${{crypto.randomUUID()}}${{path.extname(file.originalname)}}`),
}});

const upload = multer({{ storage, limits: {{ fileSize: MAX_BYTES }} }});

module.exports = {{ upload, UPLOAD_DIR }};
"#,
                require = require,
                limits = UPLOAD_LIMITS,
            )
        }
        Framework::Fastify => format!(
            r#"const fs = require('fs');
const path = require('path');
const crypto = require('crypto');
const {{ pipeline }} = require('stream/promises');
const multipart = require('@fastify/multipart');

{limits}
async function applyMultipart(app) {{
  await app.register(multipart, {{ limits: {{ fileSize: MAX_BYTES }} }});
}}

/** Stream one multipart file part to disk */
async function saveFile(part) {{
  const filename = `${{crypto.randomUUID()}}${{path.extname(part.filename)}}`;
  const target = path.join(UPLOAD_DIR, filename);
  await pipeline(part.file, fs.createWriteStream(target));
  if (part.file.truncated) {{
    await fs.promises.unlink(target);
    const err = new Error('File too large');
    err.statusCode = 413;
    throw err;
  }}
  const {{ size }} = await fs.promises.stat(target);
  return {{ filename, size }};
}}

module.exports = {{ applyMultipart, saveFile, UPLOAD_DIR }};
"#,
            limits = UPLOAD_LIMITS,
        ),
        Framework::Hapi => format!(
            r#"const fs = require('fs');
const path = require('path');
const crypto = require('crypto');

{limits}
/** Route payload options for multipart uploads */
const uploadOptions = {{
  output: 'file',
  parse: true,
  multipart: {{ output: 'file' }},
  maxBytes: MAX_BYTES,
  uploads: UPLOAD_DIR,
}};

/** Move a temporary payload file to a stable name */
async function keepFile(file) {{
  const filename = `${{crypto.randomUUID()}}${{path.extname(file.filename)}}`;
  await fs.promises.rename(file.path, path.join(UPLOAD_DIR, filename));
  return {{ filename, size: file.bytes }};
}}

module.exports = {{ uploadOptions, keepFile, UPLOAD_DIR }};
"#,
            limits = UPLOAD_LIMITS,
        ),
    };
    Some(body)
}

pub fn upload_routes(variant: &str) -> Option<String> {
    let body = match framework_variant(variant)? {
        Framework::Express => {
            r#"const { upload } = require('../middleware/upload.middleware');

function applyUploadRoutes(app) {
  app.post('/api/uploads', upload.single('file'), (req, res) => {
    if (!req.file) {
      return res.status(400).json({ error: 'Missing file field' });
    }
    res.status(201).json({ filename: req.file.filename, size: req.file.size });
  });
}
"#
        }
        Framework::Fastify => {
            r#"const { applyMultipart, saveFile } = require('../middleware/upload.middleware');

async function applyUploadRoutes(app) {
  await applyMultipart(app);
  app.post('/api/uploads', async (request, reply) => {
    const part = await request.file();
    if (!part) {
      return reply.code(400).send({ error: 'Missing file field' });
    }
    return reply.code(201).send(await saveFile(part));
  });
}
"#
        }
        Framework::Koa => {
            r#"const { upload } = require('../middleware/upload.middleware');

function applyUploadRoutes(router) {
  router.post('/api/uploads', upload.single('file'), (ctx) => {
    const file = ctx.request.file || ctx.file;
    if (!file) {
      ctx.status = 400;
      ctx.body = { error: 'Missing file field' };
      return;
    }
    ctx.status = 201;
    ctx.body = { filename: file.filename, size: file.size };
  });
}
"#
        }
        Framework::Hapi => {
            r#"const { uploadOptions, keepFile } = require('../middleware/upload.middleware');

function applyUploadRoutes(server) {
  server.route({
    method: 'POST',
    path: '/api/uploads',
    options: { payload: uploadOptions },
    handler: async (request, h) => {
      const file = request.payload && request.payload.file;
      if (!file) {
        return h.response({ error: 'Missing file field' }).code(400);
      }
      return h.response(await keepFile(file)).code(201);
    },
  });
}
"#
        }
    };
    Some(format!("{}\nmodule.exports = {{ applyUploadRoutes }};\n", body))
}

const DOCS_HEAD: &str = r#"const fs = require('fs');
const path = require('path');

const SPEC_PATH = path.join(__dirname, '..', '..', 'docs', 'openapi.yaml');

const PAGE = `<!doctype html>
<html>
  <head>
    <title>API docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>SwaggerUIBundle({ url: '/docs/openapi.yaml', dom_id: '#swagger-ui' });</script>
  </body>
</html>`;

function readSpec() {
  return fs.readFileSync(SPEC_PATH, 'utf8');
}
"#;

pub fn docs_routes(variant: &str) -> Option<String> {
    let body = match framework_variant(variant)? {
        Framework::Express => {
            r#"
function applyDocsRoutes(app) {
  app.get('/docs', (req, res) => res.type('html').send(PAGE));
  app.get('/docs/openapi.yaml', (req, res) => res.type('text/yaml').send(readSpec()));
}
"#
        }
        Framework::Fastify => {
            r#"
function applyDocsRoutes(app) {
  app.get('/docs', async (request, reply) => reply.type('text/html').send(PAGE));
  app.get('/docs/openapi.yaml', async (request, reply) => reply.type('text/yaml').send(readSpec()));
}
"#
        }
        Framework::Koa => {
            r#"
function applyDocsRoutes(router) {
  router.get('/docs', (ctx) => {
    ctx.type = 'html';
    ctx.body = PAGE;
  });
  router.get('/docs/openapi.yaml', (ctx) => {
    ctx.type = 'text/yaml';
    ctx.body = readSpec();
  });
}
"#
        }
        Framework::Hapi => {
            r#"
function applyDocsRoutes(server) {
  server.route({
    method: 'GET',
    path: '/docs',
    handler: (request, h) => h.response(PAGE).type('text/html'),
  });
  server.route({
    method: 'GET',
    path: '/docs/openapi.yaml',
    handler: (request, h) => h.response(readSpec()).type('text/yaml'),
  });
}
"#
        }
    };
    Some(format!(
        "{}{}\nmodule.exports = {{ applyDocsRoutes }};\n",
        DOCS_HEAD, body
    ))
}

const TEST_ENV: &str = r#"require('dotenv').config();

process.env.NODE_ENV = 'test';
process.env.JWT_SECRET = process.env.JWT_SECRET || 'test-secret';
"#;

pub fn test_setup(variant: &str) -> Option<String> {
    let storage = match variant {
        "relational" => {
            r#"process.env.DATABASE_FILE = process.env.DATABASE_FILE || ':memory:';

const { connectDatabase, disconnectDatabase } = require('../src/config/database');

beforeAll(async () => {
  await connectDatabase();
});

afterAll(async () => {
  await disconnectDatabase();
});
"#
        }
        "document-store" => {
            r#"const { db, connectDatabase, disconnectDatabase } = require('../src/config/database');

beforeAll(async () => {
  await connectDatabase();
});

afterAll(async () => {
  await db.connection.dropDatabase();
  await disconnectDatabase();
});
"#
        }
        // In-memory models start empty for every test file
        "memory" => "",
        _ => return None,
    };

    let mut out = String::from(TEST_ENV);
    if !storage.is_empty() {
        out.push('\n');
        out.push_str(storage);
    }
    Some(out)
}

pub fn health_test() -> String {
    r#"const request = require('supertest');
const { buildServer } = require('../src/app');

let server;

beforeAll(async () => {
  server = await buildServer();
});

describe('GET /health', () => {
  it('reports the service as up', async () => {
    const res = await request(server).get('/health');
    expect(res.status).toBe(200);
    expect(res.body).toEqual({ status: 'ok' });
  });

  it('answers unknown routes with 404', async () => {
    const res = await request(server).get('/does-not-exist');
    expect(res.status).toBe(404);
  });
});
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, Database};
    use crate::rules::validate;

    fn config(framework: Framework, features: &[Feature]) -> ValidConfig {
        validate(
            &Configuration::new("acme-api")
                .with_framework(framework)
                .with_database(Database::Postgres)
                .with_features(features.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn test_app_mounts_selected_features_in_order() {
        let config = config(
            Framework::Express,
            &[Feature::Auth, Feature::Cors, Feature::Logging, Feature::ApiDocs],
        );
        let app = app_composition("express", &config).unwrap();

        let logger = app.find("await applyRequestLogger(app)").unwrap();
        let cors = app.find("await applyCors(app)").unwrap();
        let auth = app.find("await applyAuthRoutes(app)").unwrap();
        let docs = app.find("await applyDocsRoutes(app)").unwrap();
        assert!(logger < cors && cors < auth && auth < docs);
        assert!(!app.contains("applyRateLimit"));
        assert!(app.contains("module.exports = { buildServer };"));
    }

    #[test]
    fn test_koa_routes_mount_on_router() {
        let config = config(Framework::Koa, &[Feature::Auth, Feature::RateLimit]);
        let app = app_composition("koa", &config).unwrap();
        assert!(app.contains("await applyAuthRoutes(router)"));
        assert!(app.contains("await applyRateLimit(app)"));
        assert!(app.contains("app.callback()"));
    }

    #[test]
    fn test_hapi_returns_listener() {
        let config = config(Framework::Hapi, &[]);
        let app = app_composition("hapi", &config).unwrap();
        assert!(app.contains("await server.initialize();"));
        assert!(app.contains("return server.listener;"));
    }

    #[test]
    fn test_entry_point_closes_redis_only_when_selected() {
        let with = entry_point("express", &config(Framework::Express, &[Feature::Redis])).unwrap();
        assert!(with.contains("await redis.quit();"));

        let without = entry_point("express", &config(Framework::Express, &[])).unwrap();
        assert!(!without.contains("redis"));
        assert!(without.contains("const logger = console;"));
    }

    #[test]
    fn test_rate_limit_store_follows_redis() {
        let redis = rate_limit_middleware(
            "fastify",
            &config(Framework::Fastify, &[Feature::RateLimit, Feature::Redis]),
        )
        .unwrap();
        assert!(redis.contains("redis.incr"));

        let memory = rate_limit_middleware(
            "fastify",
            &config(Framework::Fastify, &[Feature::RateLimit]),
        )
        .unwrap();
        assert!(memory.contains("new Map()"));
    }

    #[test]
    fn test_database_client_per_driver() {
        assert!(database_client("postgres").unwrap().contains("client: 'pg'"));
        assert!(database_client("sqlite").unwrap().contains("better-sqlite3"));
        assert!(database_client("mongodb").unwrap().contains("mongoose.connect"));
        assert!(database_client("none").unwrap().contains("db: null"));
        assert!(database_client("oracle").is_none());
    }

    #[test]
    fn test_setup_per_storage_family() {
        assert!(test_setup("relational").unwrap().contains("connectDatabase"));
        assert!(test_setup("document-store").unwrap().contains("dropDatabase"));
        assert!(!test_setup("memory").unwrap().contains("connectDatabase"));
        assert!(test_setup("graph").is_none());
    }
}
